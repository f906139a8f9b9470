use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use crate::schema::drivers;

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = drivers)]
pub struct NewDriver {
    pub name: String,
}

/// A driver, stored under its normalized display name. Created on first
/// sighting in a results table; never mutated, never deleted.
#[derive(Queryable, Serialize, Identifiable, PartialEq, Debug, Clone, Deserialize)]
pub struct Driver {
    pub id: i32,
    pub name: String,
}

impl Driver {
    pub fn get_by_name(conn: &mut SqliteConnection, name_in: &str) -> QueryResult<Driver> {
        use crate::schema::drivers::dsl::*;
        drivers.filter(name.eq(name_in)).first::<Driver>(conn)
    }

    pub fn get_all(conn: &mut SqliteConnection) -> QueryResult<Vec<Driver>> {
        use crate::schema::drivers::dsl::*;
        drivers.load::<Driver>(conn)
    }

    /// # upsert a driver
    /// Insert the driver if the name is new, then resolve the stored row.
    /// The name must already be normalized. Re-running over the same
    /// document hits the ignore path and returns the existing row.
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `name_in` - the normalized driver name
    ///
    /// ## Returns
    /// * `Driver` - the stored driver
    pub fn ensure_exists(conn: &mut SqliteConnection, name_in: &str) -> QueryResult<Driver> {
        let new_driver = NewDriver {
            name: name_in.to_string(),
        };

        diesel::insert_or_ignore_into(drivers::table)
            .values(&new_driver)
            .execute(conn)?;

        Driver::get_by_name(conn, name_in)
    }
}
