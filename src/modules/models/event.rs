use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use crate::schema::events;

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub season: i32,
    pub division: i32,
    pub race: i32,
    pub date: String,
    pub track: String,
}

/// One raced session, identified by its unique date string.
#[derive(Queryable, Serialize, Identifiable, PartialEq, Debug, Clone, Deserialize)]
pub struct Event {
    pub id: i32,
    pub season: i32,
    pub division: i32,
    pub race: i32,
    pub date: String,
    pub track: String,
}

impl Event {
    pub fn get_by_date(conn: &mut SqliteConnection, date_in: &str) -> QueryResult<Event> {
        use crate::schema::events::dsl::*;
        events.filter(date.eq(date_in)).first::<Event>(conn)
    }

    pub fn get_by_id(conn: &mut SqliteConnection, id_in: i32) -> QueryResult<Event> {
        use crate::schema::events::dsl::*;
        events.filter(id.eq(id_in)).first::<Event>(conn)
    }

    /// # upsert an event
    /// Insert the event if its date is new, otherwise leave the existing
    /// row untouched, then resolve the id by date. Repeated calls for the
    /// same document return the same event.
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `new_event` - the event parsed from url and event info table
    ///
    /// ## Returns
    /// * `Event` - the stored event
    pub fn ensure_exists(conn: &mut SqliteConnection, new_event: &NewEvent) -> QueryResult<Event> {
        diesel::insert_or_ignore_into(events::table)
            .values(new_event)
            .execute(conn)?;

        Event::get_by_date(conn, &new_event.date)
    }
}
