use std::env;
use std::process::exit;

use dotenvy::dotenv;
use log::{error, info};

use vec_results::modules::helpers::logging::setup_logging;
use vec_results::modules::models::general::establish_connection;
use vec_results::modules::race_api::{get_race_page, save_race};

fn main() {
    dotenv().ok();
    setup_logging().expect("failed to setup logging");

    let url = match env::args().nth(1) {
        Some(url) => url,
        None => {
            error!(target: "load_race", "usage: load_race <result page url>");
            exit(1);
        }
    };

    let connection = &mut establish_connection();

    let html = match get_race_page(&url) {
        Ok(html) => html,
        Err(error) => {
            error!(target: "load_race", "failed to fetch race page {}: {}", url, error);
            exit(1);
        }
    };

    match save_race(connection, &url, &html) {
        Ok(event) => {
            info!(target: "load_race", "saved race {} at {}", event.date, event.track);
        }
        Err(error) => {
            error!(target: "load_race", "failed to save race {}: {}", url, error);
            exit(1);
        }
    }
}
