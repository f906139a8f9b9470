use std::process::exit;

use dotenvy::dotenv;
use log::{error, info};

use vec_results::modules::helpers::logging::setup_logging;
use vec_results::modules::models::general::{create_tables, establish_connection};

fn main() {
    dotenv().ok();
    setup_logging().expect("failed to setup logging");

    let connection = &mut establish_connection();

    match create_tables(connection) {
        Ok(_) => {
            info!(target: "create_tables", "created drivers, events, results, stints and timing tables");
        }
        Err(error) => {
            error!(target: "create_tables", "failed to create tables: {}", error);
            exit(1);
        }
    }
}
