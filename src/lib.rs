pub mod errors;
pub mod schema;
pub mod modules;
