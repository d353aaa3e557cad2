// Input handling: CSV tables and schema resolution.

pub mod schema;
pub mod table;
