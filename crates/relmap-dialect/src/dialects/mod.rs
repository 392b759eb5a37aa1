//! Built-in dialects.

mod generic;
mod mysql;
mod postgres;
mod sqlite;

pub use generic::Generic;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
