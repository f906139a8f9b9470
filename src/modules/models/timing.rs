use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use crate::schema::timing;

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = timing)]
pub struct NewTimingRecord {
    pub event_id: i32,
    pub driver_id: i32,
    pub lap: i32,
    pub lap_time: f64,
    pub fuel: f64,
}

/// One reconciled lap: duration in seconds and remaining fuel fraction,
/// keyed by the driver who was actually in the car. Invalidated laps are
/// never stored.
#[derive(Queryable, Serialize, Identifiable, PartialEq, Debug, Clone, Deserialize)]
#[diesel(table_name = timing)]
pub struct TimingRecord {
    pub id: i32,
    pub event_id: i32,
    pub driver_id: i32,
    pub lap: i32,
    pub lap_time: f64,
    pub fuel: f64,
}

impl TimingRecord {
    pub fn for_event(conn: &mut SqliteConnection, event_id_in: i32) -> QueryResult<Vec<TimingRecord>> {
        use crate::schema::timing::dsl::*;
        timing
            .filter(event_id.eq(event_id_in))
            .order((driver_id.asc(), lap.asc()))
            .load::<TimingRecord>(conn)
    }

    /// # upsert a timing record
    /// The natural key is (event, driver, lap); duplicates from a re-run
    /// hit the ignore path.
    pub fn ensure_exists(
        conn: &mut SqliteConnection,
        new_record: &NewTimingRecord,
    ) -> QueryResult<TimingRecord> {
        use crate::schema::timing::dsl::*;

        diesel::insert_or_ignore_into(timing)
            .values(new_record)
            .execute(conn)?;

        timing
            .filter(event_id.eq(new_record.event_id))
            .filter(driver_id.eq(new_record.driver_id))
            .filter(lap.eq(new_record.lap))
            .first::<TimingRecord>(conn)
    }
}
