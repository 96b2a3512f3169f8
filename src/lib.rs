//! Read-only decoding of SQLite database files: header metadata and the
//! table names stored in the root `sqlite_schema` page.

pub mod commands;
pub mod db;
