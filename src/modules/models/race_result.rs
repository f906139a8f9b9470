use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use crate::schema::results;

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = results)]
pub struct NewRaceResult {
    pub event_id: i32,
    pub driver_id: i32,
    pub class_pos: i32,
    pub car_num: i32,
    pub class: String,
    pub team: String,
    pub car: String,
}

/// One driver's classification record for one event. Co-drivers of the same
/// entry each get their own row sharing the team/car/class fields.
#[derive(Queryable, Serialize, Identifiable, PartialEq, Debug, Clone, Deserialize)]
#[diesel(table_name = results)]
pub struct RaceResult {
    pub id: i32,
    pub event_id: i32,
    pub driver_id: i32,
    pub class_pos: i32,
    pub car_num: i32,
    pub class: String,
    pub team: String,
    pub car: String,
}

impl RaceResult {
    pub fn get_by_event_and_driver(
        conn: &mut SqliteConnection,
        event_id_in: i32,
        driver_id_in: i32,
    ) -> QueryResult<RaceResult> {
        use crate::schema::results::dsl::*;
        results
            .filter(event_id.eq(event_id_in))
            .filter(driver_id.eq(driver_id_in))
            .first::<RaceResult>(conn)
    }

    /// All results of one event, in insertion order. Insertion order is
    /// document order, which makes the first driver of a car the nominal
    /// timing driver everywhere a roster is built from these rows.
    pub fn for_event(conn: &mut SqliteConnection, event_id_in: i32) -> QueryResult<Vec<RaceResult>> {
        use crate::schema::results::dsl::*;
        results
            .filter(event_id.eq(event_id_in))
            .order(id.asc())
            .load::<RaceResult>(conn)
    }

    /// # upsert a result
    /// (event, driver) uniquely identifies a result; a re-run hits the
    /// ignore path and resolves the existing row.
    pub fn ensure_exists(
        conn: &mut SqliteConnection,
        new_result: &NewRaceResult,
    ) -> QueryResult<RaceResult> {
        diesel::insert_or_ignore_into(results::table)
            .values(new_result)
            .execute(conn)?;

        RaceResult::get_by_event_and_driver(conn, new_result.event_id, new_result.driver_id)
    }

    /// Map every car number of an event to the driver ids sharing it
    /// ("team roster"), roster order = document order.
    pub fn rosters_by_car(
        conn: &mut SqliteConnection,
        event_id_in: i32,
    ) -> QueryResult<HashMap<i32, Vec<i32>>> {
        let mut rosters: HashMap<i32, Vec<i32>> = HashMap::new();
        for result in RaceResult::for_event(conn, event_id_in)? {
            rosters.entry(result.car_num).or_default().push(result.driver_id);
        }

        Ok(rosters)
    }
}
