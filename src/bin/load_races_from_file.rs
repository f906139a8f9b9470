use std::env;
use std::process::exit;

use dotenvy::dotenv;
use log::{error, info};

use vec_results::errors::Error;
use vec_results::modules::helpers::general::RacesHelper;
use vec_results::modules::helpers::logging::setup_logging;
use vec_results::modules::models::general::establish_connection;
use vec_results::modules::race_api::{get_race_page, save_race};

fn main() {
    dotenv().ok();
    setup_logging().expect("failed to setup logging");

    let path = env::args().nth(1).unwrap_or_else(|| "./races.txt".to_string());

    // get all the result page urls stored in the file
    let url_list: Vec<String> = match RacesHelper::load_urls_from_file(&path) {
        Ok(urls) => urls,
        Err(Error::FileDoesNotExist { .. }) => {
            error!(target: "load_races_from_file", "File does not exist: {}", path);
            exit(1);
        }
        Err(Error::PermissionDenied { .. }) => {
            error!(target: "load_races_from_file", "Permission denied: {}", path);
            exit(1);
        }
        Err(error) => {
            error!(target: "load_races_from_file", "Failed reading {}: {}", path, error);
            exit(1);
        }
    };

    // fetch every page and save it into the database
    let connection = &mut establish_connection();
    let mut failures = 0;

    for url in url_list {
        let html = match get_race_page(&url) {
            Ok(html) => html,
            Err(error) => {
                error!(target: "load_races_from_file", "failed loading race page {}: {}", url, error);
                failures += 1;
                continue;
            }
        };

        match save_race(connection, &url, &html) {
            Ok(event) => {
                info!(target: "load_races_from_file", "saved race: {} at {}", event.date, event.track);
            }
            Err(error) => {
                error!(target: "load_races_from_file", "failed saving race {}: {}", url, error);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        exit(1);
    }
}
