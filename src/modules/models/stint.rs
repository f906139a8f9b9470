use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use crate::schema::stints;

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = stints)]
pub struct NewStint {
    pub event_id: i32,
    pub driver_id: i32,
    pub lap_start: i32,
    pub lap_end: i32,
}

/// A contiguous block of laps one driver piloted a car. A driver can have
/// several stints per event (pit-stop driver changes).
#[derive(Queryable, Serialize, Identifiable, PartialEq, Debug, Clone, Deserialize)]
pub struct Stint {
    pub id: i32,
    pub event_id: i32,
    pub driver_id: i32,
    pub lap_start: i32,
    pub lap_end: i32,
}

impl Stint {
    pub fn for_event(conn: &mut SqliteConnection, event_id_in: i32) -> QueryResult<Vec<Stint>> {
        use crate::schema::stints::dsl::*;
        stints
            .filter(event_id.eq(event_id_in))
            .order(id.asc())
            .load::<Stint>(conn)
    }

    /// Whether this stint covers the given lap, boundaries included.
    pub fn covers(&self, lap: i32) -> bool {
        self.lap_start <= lap && lap <= self.lap_end
    }

    /// # upsert a stint
    /// The natural key is (event, driver, lap_start, lap_end); a re-run
    /// hits the ignore path.
    pub fn ensure_exists(conn: &mut SqliteConnection, new_stint: &NewStint) -> QueryResult<Stint> {
        use crate::schema::stints::dsl::*;

        diesel::insert_or_ignore_into(stints)
            .values(new_stint)
            .execute(conn)?;

        stints
            .filter(event_id.eq(new_stint.event_id))
            .filter(driver_id.eq(new_stint.driver_id))
            .filter(lap_start.eq(new_stint.lap_start))
            .filter(lap_end.eq(new_stint.lap_end))
            .first::<Stint>(conn)
    }
}
