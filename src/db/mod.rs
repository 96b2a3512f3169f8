//! SQLite database file parsing.

mod constants;
mod error;
mod header;
mod varint;

pub mod page;
pub mod schema;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export public API
pub use error::{DecodeError, Result};
pub use header::{DatabaseHeader, PageHeader, PageType, read_database_header, read_page_header};
pub use schema::{
    DbInfo, SchemaEntry, db_info, list_tables, read_db_info, read_schema, read_table_names,
};
pub use varint::{decode_varint, encoded_size};
