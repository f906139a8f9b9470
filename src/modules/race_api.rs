use std::collections::HashMap;

use diesel::sqlite::SqliteConnection;
use log::{info, warn};
use regex::Regex;

use crate::errors::{CustomResult, Error};
use crate::modules::helpers::general::Formatting;
use crate::modules::helpers::timing::{TimingHelper, INVALID_LAP_TIME};
use crate::modules::models::driver::Driver;
use crate::modules::models::event::{Event, NewEvent};
use crate::modules::models::race_result::{NewRaceResult, RaceResult};
use crate::modules::models::stint::{NewStint, Stint};
use crate::modules::models::timing::{NewTimingRecord, TimingRecord};
use crate::modules::tables::{self, KeyedTable};

/// Race sessions run well past this many laps; qualifying tables share the
/// timing layout but stay short, so a row-count threshold separates them.
const MIN_RACE_LAPS: usize = 20;

/// Fetch a result page. One blocking read, no retries; a failed fetch
/// propagates to the operator.
pub fn get_race_page(url: &str) -> CustomResult<String> {
    info!(target: "race_api:get_race_page", "Getting race page {}", url);
    let response = reqwest::blocking::get(url)?;
    Ok(response.text()?)
}

/// Ingest one result page into the store. The five stages run strictly
/// top to bottom over the same document: event, drivers, results, stints,
/// timing. Every insert is an upsert, so running this twice over the same
/// document leaves the store unchanged.
pub fn save_race(conn: &mut SqliteConnection, url: &str, html: &str) -> CustomResult<Event> {
    let event = register_event(conn, url, html)?;

    let results_table = tables::find_exactly_one(html, "Total time", "driver names and results")?;
    let results_table = KeyedTable::from_table(&results_table, "Total time", "driver names and results")?;

    let driver_ids = register_drivers(conn, &results_table)?;
    save_results(conn, event.id, &results_table, &driver_ids)?;
    save_stints(conn, event.id, html, &driver_ids)?;
    save_timing(conn, &event, html, &driver_ids)?;

    info!(target: "race_api:save_race", "race {} ({}) saved", event.date, event.track);
    Ok(event)
}

/// The three digit runs of a result page url carry season, division and
/// race, in that order. Any other count means the url scheme changed and
/// the ordinals would be misassigned, so it is rejected.
fn event_ordinals(url: &str) -> CustomResult<(i32, i32, i32)> {
    let digit_run = Regex::new("[0-9]+").unwrap();
    let numbers: Vec<&str> = digit_run.find_iter(url).map(|m| m.as_str()).collect();

    if numbers.len() != 3 {
        return Err(Error::MalformedUrl {
            url: url.to_string(),
            found: numbers.len(),
        });
    }

    Ok((
        parse_int(numbers[0], "season")?,
        parse_int(numbers[1], "division")?,
        parse_int(numbers[2], "race")?,
    ))
}

fn register_event(conn: &mut SqliteConnection, url: &str, html: &str) -> CustomResult<Event> {
    let (season, division, race) = event_ordinals(url)?;

    let info = tables::find_exactly_one(html, "Server Name", "event info")?;
    let date = info.value_for_label("Date", "event info")?;
    let track = info.value_for_label("Track", "event info")?;

    let event = Event::ensure_exists(
        conn,
        &NewEvent {
            season,
            division,
            race,
            date: date.to_string(),
            track: track.to_string(),
        },
    )?;

    info!(
        target: "race_api:register_event",
        "event {}: {} at {} (season {}, division {}, race {})",
        event.id, event.date, event.track, event.season, event.division, event.race
    );
    Ok(event)
}

/// Split the comma-separated co-driver cells of the results table and
/// upsert every normalized name. The returned map is the name index the
/// later stages resolve against instead of querying the store per row.
fn register_drivers(
    conn: &mut SqliteConnection,
    results_table: &KeyedTable,
) -> CustomResult<HashMap<String, i32>> {
    let drivers_col = results_table.column("Drivers", "driver names and results")?;

    let mut driver_ids = HashMap::new();
    for row in &results_table.rows {
        for raw in tables::value(row, drivers_col).split(',') {
            let name = Formatting::normalize_name(raw);
            if name.is_empty() {
                continue;
            }
            let driver = Driver::ensure_exists(conn, &name)?;
            driver_ids.insert(name, driver.id);
        }
    }

    Ok(driver_ids)
}

/// One result row per co-driver of each entry, all sharing the entry's
/// class position, car number, class, team and car model.
fn save_results(
    conn: &mut SqliteConnection,
    event_id: i32,
    results_table: &KeyedTable,
    driver_ids: &HashMap<String, i32>,
) -> CustomResult<()> {
    let section = "driver names and results";
    let drivers_col = results_table.column("Drivers", section)?;
    let class_pos_col = results_table.column("In Class", section)?;
    let car_num_col = results_table.column("Car", section)?;
    let class_col = results_table.column("Class", section)?;
    let team_col = results_table.column("Team", section)?;
    let car_col = results_table.column("Car Model", section)?;

    for row in &results_table.rows {
        let class_pos = parse_int(tables::value(row, class_pos_col), "class position")?;
        let car_num = parse_int(tables::value(row, car_num_col), "car number")?;

        for raw in tables::value(row, drivers_col).split(',') {
            let name = Formatting::normalize_name(raw);
            if name.is_empty() {
                continue;
            }
            let driver_id = resolve_driver_id(driver_ids, &name)?;

            RaceResult::ensure_exists(
                conn,
                &NewRaceResult {
                    event_id,
                    driver_id,
                    class_pos,
                    car_num,
                    class: tables::value(row, class_col).to_string(),
                    team: tables::value(row, team_col).to_string(),
                    car: tables::value(row, car_col).to_string(),
                },
            )?;
        }
    }

    Ok(())
}

/// Walk every stint table (one per team page). Rows without a driver are
/// recording gaps on the server side and are dropped, never defaulted.
fn save_stints(
    conn: &mut SqliteConnection,
    event_id: i32,
    html: &str,
    driver_ids: &HashMap<String, i32>,
) -> CustomResult<()> {
    let stint_tables = tables::find_tables(html, "Startlap");
    if stint_tables.is_empty() {
        return Err(Error::UnexpectedStructure {
            section: "stint info",
            expected: 1,
            found: 0,
        });
    }

    for table in &stint_tables {
        let keyed = KeyedTable::from_table(table, "Startlap", "stint info")?;
        let driver_col = keyed.column("Driver", "stint info")?;
        let start_col = keyed.column("Startlap", "stint info")?;
        let end_col = keyed.column("Ending lap", "stint info")?;

        for row in &keyed.rows {
            let raw_driver = tables::value(row, driver_col);
            if raw_driver.is_empty() {
                warn!(
                    target: "race_api:save_stints",
                    "dropping stint row without driver (laps {} - {})",
                    tables::value(row, start_col),
                    tables::value(row, end_col)
                );
                continue;
            }

            let name = Formatting::normalize_name(raw_driver);
            let driver_id = resolve_driver_id(driver_ids, &name)?;
            let lap_start = TimingHelper::parse_lap_number(tables::value(row, start_col))?;
            let lap_end = TimingHelper::parse_lap_number(tables::value(row, end_col))?;

            Stint::ensure_exists(
                conn,
                &NewStint {
                    event_id,
                    driver_id,
                    lap_start,
                    lap_end,
                },
            )?;
        }
    }

    Ok(())
}

/// Walk every per-team live timing table and reconcile each lap to the
/// driver who was actually in the car. The table only names one nominal
/// driver; the stint intervals are the ground truth for who drove when.
fn save_timing(
    conn: &mut SqliteConnection,
    event: &Event,
    html: &str,
    driver_ids: &HashMap<String, i32>,
) -> CustomResult<()> {
    let section = "live timing";

    // indices built once per event, the per-lap loop never hits the store
    let rosters = RaceResult::rosters_by_car(conn, event.id)?;
    let car_for_driver: HashMap<i32, i32> = RaceResult::for_event(conn, event.id)?
        .into_iter()
        .map(|r| (r.driver_id, r.car_num))
        .collect();
    let stints = Stint::for_event(conn, event.id)?;

    for table in tables::find_tables(html, "Fuel level") {
        let keyed = KeyedTable::from_table(&table, "Fuel level", section)?;
        if keyed.rows.len() < MIN_RACE_LAPS {
            // qualifying session sharing the race table layout
            continue;
        }

        // the banner row embeds the nominal driver's name in its first cell
        let nominal_raw = keyed
            .banner
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| Error::MissingLabel {
                label: "nominal driver".to_string(),
                section,
            })?;
        let nominal_name = Formatting::normalize_name(nominal_raw);
        let nominal_id = resolve_driver_id(driver_ids, &nominal_name)?;

        let car_num = *car_for_driver
            .get(&nominal_id)
            .ok_or_else(|| Error::UnknownDriver {
                name: nominal_name.clone(),
            })?;
        let roster = rosters
            .get(&car_num)
            .ok_or_else(|| Error::UnknownDriver {
                name: nominal_name.clone(),
            })?;

        let lap_col = keyed.column("Lap", section)?;
        let fuel_col = keyed.column_containing("Fuel level", section)?;
        let time_col = keyed.column_containing("time", section)?;

        let mut defaulted = false;
        for row in &keyed.rows {
            let raw_time = tables::value(row, time_col);
            if raw_time == INVALID_LAP_TIME {
                // incomplete, invalidated or pit-affected lap
                continue;
            }

            let lap_time = TimingHelper::parse_lap_time(raw_time)?;
            let lap = parse_int(tables::value(row, lap_col), "lap number")?;
            let fuel = TimingHelper::parse_fuel(tables::value(row, fuel_col))?;

            let active: Vec<i32> = stints
                .iter()
                .filter(|s| s.covers(lap))
                .map(|s| s.driver_id)
                .collect();

            let driver_id = match reconcile_driver(roster, &active, lap)? {
                Some(driver_id) => driver_id,
                None => {
                    // no stint ever closed for this car: the starting driver
                    // retired before the first driver change. Defaulting to
                    // the nominal driver is a policy choice, not a guarantee.
                    if !defaulted {
                        warn!(
                            target: "race_api:save_timing",
                            "car {} has laps outside any stint, defaulting to driver {}",
                            car_num, roster[0]
                        );
                        defaulted = true;
                    }
                    roster[0]
                }
            };

            TimingRecord::ensure_exists(
                conn,
                &NewTimingRecord {
                    event_id: event.id,
                    driver_id,
                    lap,
                    lap_time,
                    fuel,
                },
            )?;
        }
    }

    Ok(())
}

/// Intersect the drivers whose stints cover this lap with the team roster.
/// Exactly one driver must remain; none at all is the documented
/// retired-before-first-stint case and left to the caller's default.
fn reconcile_driver(roster: &[i32], active: &[i32], lap: i32) -> CustomResult<Option<i32>> {
    let on_lap: Vec<i32> = roster
        .iter()
        .copied()
        .filter(|driver| active.contains(driver))
        .collect();

    match on_lap.len() {
        0 => Ok(None),
        1 => Ok(Some(on_lap[0])),
        _ => Err(Error::AmbiguousDriver {
            lap,
            candidates: on_lap,
        }),
    }
}

fn resolve_driver_id(driver_ids: &HashMap<String, i32>, name: &str) -> CustomResult<i32> {
    driver_ids
        .get(name)
        .copied()
        .ok_or_else(|| Error::UnknownDriver {
            name: name.to_string(),
        })
}

fn parse_int(raw: &str, expected: &'static str) -> CustomResult<i32> {
    raw.trim().parse().map_err(|_| Error::MalformedValue {
        value: raw.to_string(),
        expected,
    })
}
