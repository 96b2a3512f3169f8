//! Page and record parsing for SQLite database format.

mod page;
mod record;

pub use page::read_cell_pointers;
pub use record::{DecodedRow, column_size, decode_cell, is_text, read_cell};
