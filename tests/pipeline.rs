use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use vec_results::errors::Error;
use vec_results::modules::models::driver::Driver;
use vec_results::modules::models::general::create_tables;
use vec_results::modules::models::timing::TimingRecord;
use vec_results::modules::race_api::save_race;
use vec_results::schema::{drivers, events, results, stints, timing};

const URL: &str = "https://simracing.club/ResultsSystem/vec/s17/d1r3.html";

fn connection() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    create_tables(&mut conn).unwrap();
    conn
}

fn info_table() -> String {
    "<table>
        <tr><th>Server Name</th><td>VEC Season 17</td></tr>
        <tr><td>Session</td><td>Race</td></tr>
        <tr><td>Date</td><td>27.03.21</td></tr>
        <tr><td>Track</td><td>Spa-Francorchamps</td></tr>
    </table>"
        .to_string()
}

fn results_table() -> String {
    "<table>
        <tr><th>Pos</th><th>In Class</th><th>Car</th><th>Class</th><th>Team</th>\
         <th>Car Model</th><th>Drivers</th><th>Laps</th><th>Total time</th></tr>
        <tr><td>1</td><td>1</td><td>11</td><td>GT3</td><td>Alpha Racing</td>\
         <td>Porsche 911</td><td>MAX VERSTAPPEN, sergio perez</td><td>25</td><td>12:34:56.789</td></tr>
        <tr><td>2</td><td>2</td><td>22</td><td>GT3</td><td>Beta Racing</td>\
         <td>Ferrari 488</td><td> lando norris , Oscar PIASTRI</td><td>25</td><td>12:35:10.123</td></tr>
    </table>"
        .to_string()
}

fn stint_table(banner: &str, rows: &[(&str, &str, &str)]) -> String {
    let mut table = format!(
        "<table>\n<tr><th colspan=\"3\">{banner}</th></tr>\n\
         <tr><th>Driver</th><th>Startlap</th><th>Ending lap</th></tr>\n"
    );
    for (driver, start, end) in rows {
        table += &format!("<tr><td>{driver}</td><td>{start}</td><td>{end}</td></tr>\n");
    }
    table += "</table>";
    table
}

fn timing_table(driver: &str, laps: i32, sentinel_lap: Option<i32>, lap_time: &str) -> String {
    let mut table = format!(
        "<table>\n<tr><th colspan=\"6\">{driver}</th></tr>\n\
         <tr><th>Lap</th><th>Fuel level</th><th>Position</th><th>Pit</th><th>Gap</th><th>Lap time</th></tr>\n"
    );
    for lap in 1..=laps {
        let time = if Some(lap) == sentinel_lap { "00:00.---" } else { lap_time };
        let fuel = 100 - 2 * lap;
        table += &format!(
            "<tr><td>{lap}</td><td>{fuel}%</td><td>1</td><td>0</td><td>-</td><td>{time}</td></tr>\n"
        );
    }
    table += "</table>";
    table
}

/// A full race report: one info table, one results table, two team stint
/// tables (one with a recording gap, one with no driver at all), two race
/// timing tables and one short qualifying table that must be ignored.
fn race_document() -> String {
    let car_11_stints = stint_table(
        "Car 11",
        &[
            ("max verstappen", "L1", "L12"),
            ("", "L13", "L18"),
            ("Sergio Perez", "L19", "L25"),
        ],
    );
    let car_22_stints = stint_table("Car 22", &[("", "L1", "L25")]);

    format!(
        "<html><body>\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n</body></html>",
        info_table(),
        results_table(),
        car_11_stints,
        car_22_stints,
        timing_table("MAX VERSTAPPEN", 25, Some(5), "1:32.456"),
        timing_table("lando norris", 25, None, "1:33.000"),
        timing_table("MAX VERSTAPPEN", 3, None, "1:30.000"), // qualifying
    )
}

fn row_counts(conn: &mut SqliteConnection) -> (i64, i64, i64, i64, i64) {
    (
        drivers::table.count().get_result(conn).unwrap(),
        events::table.count().get_result(conn).unwrap(),
        results::table.count().get_result(conn).unwrap(),
        stints::table.count().get_result(conn).unwrap(),
        timing::table.count().get_result(conn).unwrap(),
    )
}

#[test]
fn pipeline_populates_all_tables() {
    let conn = &mut connection();
    save_race(conn, URL, &race_document()).unwrap();

    // 4 drivers, 1 event, 4 results, 2 stints (gap rows dropped),
    // 49 timing rows (2 cars x 25 laps, minus one sentinel lap)
    assert_eq!(row_counts(conn), (4, 1, 4, 2, 49));
}

#[test]
fn pipeline_is_idempotent() {
    let conn = &mut connection();
    save_race(conn, URL, &race_document()).unwrap();
    let first = row_counts(conn);

    save_race(conn, URL, &race_document()).unwrap();
    assert_eq!(row_counts(conn), first);
}

#[test]
fn reparsing_resolves_the_same_event() {
    let conn = &mut connection();
    let first = save_race(conn, URL, &race_document()).unwrap();
    let second = save_race(conn, URL, &race_document()).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.date, "27.03.21");
    assert_eq!(second.track, "Spa-Francorchamps");
    assert_eq!((second.season, second.division, second.race), (17, 1, 3));
}

#[test]
fn driver_names_collapse_to_normalized_form() {
    let conn = &mut connection();
    save_race(conn, URL, &race_document()).unwrap();

    // results list "MAX VERSTAPPEN", stints "max verstappen": one row
    let max = Driver::get_by_name(conn, "Max Verstappen").unwrap();
    assert!(Driver::get_by_name(conn, "MAX VERSTAPPEN").is_err());

    let again = Driver::ensure_exists(conn, "Max Verstappen").unwrap();
    assert_eq!(max.id, again.id);
}

#[test]
fn timing_is_reconciled_against_stints() {
    let conn = &mut connection();
    let event = save_race(conn, URL, &race_document()).unwrap();

    let max = Driver::get_by_name(conn, "Max Verstappen").unwrap();
    let sergio = Driver::get_by_name(conn, "Sergio Perez").unwrap();
    let records = TimingRecord::for_event(conn, event.id).unwrap();

    // laps 1-12 by stint, 13-18 defaulted to the nominal driver, minus the
    // invalidated lap 5
    let max_laps: Vec<i32> = records.iter().filter(|t| t.driver_id == max.id).map(|t| t.lap).collect();
    assert_eq!(max_laps.len(), 17);
    assert!(!max_laps.contains(&5));
    assert!(max_laps.contains(&13));

    // laps 19-25 by stint
    let sergio_laps: Vec<i32> =
        records.iter().filter(|t| t.driver_id == sergio.id).map(|t| t.lap).collect();
    assert_eq!(sergio_laps, vec![19, 20, 21, 22, 23, 24, 25]);
}

#[test]
fn car_without_stints_defaults_every_lap_to_the_nominal_driver() {
    let conn = &mut connection();
    let event = save_race(conn, URL, &race_document()).unwrap();

    let lando = Driver::get_by_name(conn, "Lando Norris").unwrap();
    let oscar = Driver::get_by_name(conn, "Oscar Piastri").unwrap();
    let records = TimingRecord::for_event(conn, event.id).unwrap();

    assert_eq!(records.iter().filter(|t| t.driver_id == lando.id).count(), 25);
    assert_eq!(records.iter().filter(|t| t.driver_id == oscar.id).count(), 0);
}

#[test]
fn lap_time_and_fuel_values_are_converted() {
    let conn = &mut connection();
    let event = save_race(conn, URL, &race_document()).unwrap();

    let max = Driver::get_by_name(conn, "Max Verstappen").unwrap();
    let records = TimingRecord::for_event(conn, event.id).unwrap();
    let lap_2 = records
        .iter()
        .find(|t| t.driver_id == max.id && t.lap == 2)
        .unwrap();

    assert!((lap_2.lap_time - 92.456).abs() < 1e-9);
    assert!((lap_2.fuel - 0.96).abs() < 1e-9);
}

#[test]
fn overlapping_stints_abort_ingestion() {
    let conn = &mut connection();

    let overlapping = stint_table(
        "Car 11",
        &[
            ("max verstappen", "L1", "L25"),
            ("Sergio Perez", "L20", "L25"),
        ],
    );
    let html = format!(
        "<html><body>\n{}\n{}\n{}\n{}\n</body></html>",
        info_table(),
        results_table(),
        overlapping,
        timing_table("MAX VERSTAPPEN", 25, None, "1:32.456"),
    );

    assert!(matches!(
        save_race(conn, URL, &html),
        Err(Error::AmbiguousDriver { lap: 20, .. })
    ));
}

#[test]
fn duplicated_info_table_is_rejected() {
    let conn = &mut connection();
    let html = format!(
        "<html><body>\n{}\n{}\n{}\n</body></html>",
        info_table(),
        info_table(),
        results_table(),
    );

    assert!(matches!(
        save_race(conn, URL, &html),
        Err(Error::UnexpectedStructure { expected: 1, found: 2, .. })
    ));
}

#[test]
fn missing_stint_tables_are_rejected() {
    let conn = &mut connection();
    let html = format!(
        "<html><body>\n{}\n{}\n</body></html>",
        info_table(),
        results_table(),
    );

    assert!(matches!(
        save_race(conn, URL, &html),
        Err(Error::UnexpectedStructure { found: 0, .. })
    ));
}

#[test]
fn url_with_extra_digit_runs_is_rejected() {
    let conn = &mut connection();
    let url = "https://simracing.club/ResultsSystem2/vec/s17/d1r3.html";

    assert!(matches!(
        save_race(conn, url, &race_document()),
        Err(Error::MalformedUrl { found: 4, .. })
    ));
}
