//! Cell pointer array parsing for SQLite b-tree pages.

use std::io::{Read, Seek};

use bytes::Buf;
use tracing::debug;

use crate::db::constants::CELL_POINTER_SIZE;
use crate::db::error::Result;
use crate::db::header::read_exact_at;

/// Read the cell pointer array that follows a page header.
///
/// The array holds `cell_count` 2-byte big-endian offsets, each pointing
/// to a cell within the page. They are returned in the order stored on
/// disk, which is the b-tree's key order rather than offset order.
///
/// # Arguments
///
/// * `file` - The opened database file
/// * `page_header_end` - Absolute file offset just past the page header
/// * `cell_count` - Number of cells declared by the page header
///
/// # Returns
///
/// Returns a vector of cell offsets in bytes, or an I/O error on a short read.
pub fn read_cell_pointers<R: Read + Seek>(
    file: &mut R,
    page_header_end: u64,
    cell_count: u16,
) -> Result<Vec<usize>> {
    let mut array = vec![0u8; cell_count as usize * CELL_POINTER_SIZE];
    read_exact_at(file, page_header_end, &mut array, "cell pointer array")?;

    let mut buf = array.as_slice();
    let mut offsets = Vec::with_capacity(cell_count as usize);
    while buf.has_remaining() {
        offsets.push(buf.get_u16() as usize);
    }

    debug!(?offsets, "read cell pointers");
    Ok(offsets)
}
