use std::collections::HashMap;
use std::env;
use std::process::exit;

use dotenvy::dotenv;
use log::error;

use vec_results::modules::helpers::logging::setup_logging;
use vec_results::modules::helpers::math::Math;
use vec_results::modules::models::driver::Driver;
use vec_results::modules::models::event::Event;
use vec_results::modules::models::general::establish_connection;
use vec_results::modules::models::race_result::RaceResult;
use vec_results::modules::models::timing::TimingRecord;

/// Per-driver race pace for one event and class: lap times above the 95th
/// percentile of the class are treated as outliers (pit laps, incidents) and
/// dropped, drivers are ranked by median of what remains.
fn main() {
    dotenv().ok();
    setup_logging().expect("failed to setup logging");

    let mut args = env::args().skip(1);
    let event_id: i32 = match args.next().unwrap_or_else(|| "1".to_string()).parse() {
        Ok(event_id) => event_id,
        Err(_) => {
            error!(target: "pace_report", "usage: pace_report [event id] [class]");
            exit(1);
        }
    };
    let car_class = args.next().unwrap_or_else(|| "GT3".to_string());

    let connection = &mut establish_connection();

    let event = match Event::get_by_id(connection, event_id) {
        Ok(event) => event,
        Err(error) => {
            error!(target: "pace_report", "no event with id {}: {}", event_id, error);
            exit(1);
        }
    };

    let (timing, results, drivers) = match (
        TimingRecord::for_event(connection, event_id),
        RaceResult::for_event(connection, event_id),
        Driver::get_all(connection),
    ) {
        (Ok(timing), Ok(results), Ok(drivers)) => (timing, results, drivers),
        _ => {
            error!(target: "pace_report", "failed loading timing data for event {}", event_id);
            exit(1);
        }
    };

    let class_of: HashMap<i32, &str> =
        results.iter().map(|r| (r.driver_id, r.class.as_str())).collect();
    let name_of: HashMap<i32, &str> =
        drivers.iter().map(|d| (d.id, d.name.as_str())).collect();

    // pool all lap times of the class to find the outlier cutoff
    let class_laps: Vec<f64> = timing
        .iter()
        .filter(|t| class_of.get(&t.driver_id) == Some(&car_class.as_str()))
        .map(|t| t.lap_time)
        .collect();

    if class_laps.is_empty() {
        println!("no timing data for class {} in event {}", car_class, event_id);
        return;
    }

    let cutoff = Math::percentile(class_laps.clone(), 0.95);

    let mut laps_by_driver: HashMap<i32, Vec<f64>> = HashMap::new();
    for record in &timing {
        if class_of.get(&record.driver_id) == Some(&car_class.as_str()) && record.lap_time < cutoff {
            laps_by_driver.entry(record.driver_id).or_default().push(record.lap_time);
        }
    }

    let mut pace: Vec<(&str, f64, usize)> = laps_by_driver
        .into_iter()
        .map(|(driver_id, laps)| {
            let count = laps.len();
            let median = Math::median(laps);
            (name_of.get(&driver_id).copied().unwrap_or("?"), median, count)
        })
        .collect();
    pace.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    println!(
        "Race pace, {} at {} - class {} ({} laps, outliers above {:.3}s dropped)",
        event.date,
        event.track,
        car_class,
        class_laps.len(),
        cutoff
    );
    for (rank, (name, median, count)) in pace.iter().enumerate() {
        println!(
            "{:>3}. {:<30} median {:>8.3}s over {:>3} laps",
            rank + 1,
            name,
            Math::round_float_to_n_decimals(*median, 3),
            count
        );
    }
}
