//! Custom Resource Definitions for the MySQL operator

mod mysql;

pub use mysql::{MySql, MySqlSpec, MySqlStatus};
