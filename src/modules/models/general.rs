use std::env;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use dotenvy::dotenv;

pub fn establish_connection() -> SqliteConnection {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "vec.sqlite".to_string());
    SqliteConnection::establish(&database_url)
        .unwrap_or_else(|_| panic!("Error connecting to {}", database_url))
}

/// Fixed persisted-state contract of the store. Dropping and recreating is
/// the only supported way to change it, there is no migration story.
pub const CREATE_TABLES_SQL: &str = "
DROP TABLE IF EXISTS drivers;
DROP TABLE IF EXISTS events;
DROP TABLE IF EXISTS results;
DROP TABLE IF EXISTS stints;
DROP TABLE IF EXISTS timing;

CREATE TABLE drivers (
    id     INTEGER PRIMARY KEY,
    name   TEXT NOT NULL UNIQUE
);

CREATE TABLE events (
    id          INTEGER PRIMARY KEY,
    season      INTEGER NOT NULL,
    division    INTEGER NOT NULL,
    race        INTEGER NOT NULL,
    date        TEXT NOT NULL UNIQUE,
    track       TEXT NOT NULL
);

CREATE TABLE results (
    id          INTEGER PRIMARY KEY,
    event_id    INTEGER NOT NULL REFERENCES events (id),
    driver_id   INTEGER NOT NULL REFERENCES drivers (id),
    class_pos   INTEGER NOT NULL,
    car_num     INTEGER NOT NULL,
    class       TEXT NOT NULL,
    team        TEXT NOT NULL,
    car         TEXT NOT NULL,
    UNIQUE (event_id, driver_id)
);

CREATE TABLE stints (
    id          INTEGER PRIMARY KEY,
    event_id    INTEGER NOT NULL REFERENCES events (id),
    driver_id   INTEGER NOT NULL REFERENCES drivers (id),
    lap_start   INTEGER NOT NULL,
    lap_end     INTEGER NOT NULL,
    UNIQUE (event_id, driver_id, lap_start, lap_end)
);

CREATE TABLE timing (
    id          INTEGER PRIMARY KEY,
    event_id    INTEGER NOT NULL REFERENCES events (id),
    driver_id   INTEGER NOT NULL REFERENCES drivers (id),
    lap         INTEGER NOT NULL,
    lap_time    REAL NOT NULL,
    fuel        REAL NOT NULL,
    UNIQUE (event_id, driver_id, lap)
);
";

pub fn create_tables(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(CREATE_TABLES_SQL)
}
