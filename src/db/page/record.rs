//! Record parsing utilities for SQLite database format.

use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;

use bytes::{Buf, Bytes};
use tracing::trace;

use crate::db::error::{DecodeError, Result};
use crate::db::varint::{decode_varint, encoded_size};

/// A decoded table-leaf cell: its rowid plus the record's columns.
///
/// Column values are kept as slices of the cell bytes and only
/// interpreted when an accessor asks for them.
#[derive(Debug, Clone)]
pub struct DecodedRow {
    pub payload_length: u64,
    pub rowid: u64,
    serial_types: Vec<u64>,
    /// Value ranges within `body`. Shorter than `serial_types` when a column
    /// with no defined length stops the layout.
    columns: Vec<Range<usize>>,
    body: Bytes,
}

impl DecodedRow {
    /// Get the number of columns in this record.
    pub fn column_count(&self) -> usize {
        self.serial_types.len()
    }

    pub fn serial_types(&self) -> &[u64] {
        &self.serial_types
    }

    fn locate(&self, column: usize) -> Result<(u64, Range<usize>)> {
        let serial_type = *self
            .serial_types
            .get(column)
            .ok_or(DecodeError::SchemaMismatch {
                column,
                columns: self.serial_types.len(),
            })?;

        match self.columns.get(column) {
            Some(range) => Ok((serial_type, range.clone())),
            None => {
                let blocking = self.columns.len();
                Err(DecodeError::UnsupportedSerialType {
                    column: blocking,
                    serial_type: self.serial_types[blocking],
                })
            }
        }
    }

    /// Raw value bytes of a column.
    pub fn raw(&self, column: usize) -> Result<Bytes> {
        let (_, range) = self.locate(column)?;
        Ok(self.body.slice(range))
    }

    /// Read a text column.
    ///
    /// The bytes are taken as stored, not transcoded. Sequences that are
    /// not valid UTF-8 are replaced with U+FFFD.
    pub fn text(&self, column: usize) -> Result<String> {
        let (serial_type, range) = self.locate(column)?;
        if !is_text(serial_type) {
            return Err(DecodeError::UnsupportedSerialType {
                column,
                serial_type,
            });
        }
        Ok(String::from_utf8_lossy(&self.body[range]).into_owned())
    }

    /// Read an integer column. NULL reads as 0.
    pub fn integer(&self, column: usize) -> Result<i64> {
        let (serial_type, range) = self.locate(column)?;
        match serial_type {
            0 | 8 => Ok(0),
            9 => Ok(1),
            1..=6 => Ok(sign_extend(&self.body[range])),
            _ => Err(DecodeError::UnsupportedSerialType {
                column,
                serial_type,
            }),
        }
    }

    pub fn is_null(&self, column: usize) -> Result<bool> {
        let (serial_type, _) = self.locate(column)?;
        Ok(serial_type == 0)
    }
}

/// Get the size in bytes of a column value based on its serial type code.
///
/// Returns `None` for the reserved codes 10 and 11, which have no defined length.
pub fn column_size(serial_type: u64) -> Option<usize> {
    match serial_type {
        0 => Some(0),                                                // NULL
        1 => Some(1),                                                // 8-bit integer
        2 => Some(2),                                                // 16-bit integer
        3 => Some(3),                                                // 24-bit integer
        4 => Some(4),                                                // 32-bit integer
        5 => Some(6),                                                // 48-bit integer
        6 => Some(8),                                                // 64-bit integer
        7 => Some(8),                                                // IEEE 754 float
        8 | 9 => Some(0),                                            // Integer constants 0 and 1
        10 | 11 => None,                                             // Reserved
        n if n % 2 == 0 => Some(((n - 12) / 2) as usize),            // BLOB
        n => Some(((n - 13) / 2) as usize),                          // Text string
    }
}

pub fn is_text(serial_type: u64) -> bool {
    serial_type >= 13 && serial_type % 2 == 1
}

fn sign_extend(bytes: &[u8]) -> i64 {
    let Some((&first, rest)) = bytes.split_first() else {
        return 0;
    };
    rest.iter()
        .fold(first as i8 as i64, |acc, &b| (acc << 8) | b as i64)
}

/// Sequential reader over a cell's bytes that knows its absolute position.
struct CellCursor {
    buf: Bytes,
    base: usize,
    len: usize,
}

impl CellCursor {
    fn new(buf: Bytes, base: usize) -> Self {
        let len = buf.len();
        Self { buf, base, len }
    }

    fn position(&self) -> usize {
        self.base + self.len - self.buf.remaining()
    }

    fn varint(&mut self) -> Result<(u64, usize)> {
        let offset = self.position();
        decode_varint(&mut self.buf).map_err(|err| match err {
            DecodeError::TruncatedVarint { consumed, .. } => {
                DecodeError::TruncatedVarint { offset, consumed }
            }
            other => other,
        })
    }

    fn split_to(&mut self, needed: usize) -> Result<Bytes> {
        let available = self.buf.remaining();
        if needed > available {
            return Err(DecodeError::Truncated {
                offset: self.position(),
                needed,
                available,
            });
        }
        Ok(self.buf.split_to(needed))
    }
}

/// Read and decode the table-leaf cell at `cell_offset`.
///
/// Only bytes up to `page_end` belong to the cell; anything the cell
/// claims beyond that is reported as truncation.
///
/// # Arguments
///
/// * `file` - The opened database file
/// * `cell_offset` - Absolute offset of the cell, taken from the cell pointer array
/// * `page_end` - Absolute offset one past the last byte of the page
///
/// # Returns
///
/// Returns the decoded row, or an error if the cell is malformed or truncated.
pub fn read_cell<R: Read + Seek>(
    file: &mut R,
    cell_offset: usize,
    page_end: usize,
) -> Result<DecodedRow> {
    if cell_offset >= page_end {
        return Err(DecodeError::Truncated {
            offset: cell_offset,
            needed: 1,
            available: 0,
        });
    }

    let mut cell = Vec::new();
    file.seek(SeekFrom::Start(cell_offset as u64))
        .map_err(DecodeError::io("cell", cell_offset as u64))?;
    Read::take(&mut *file, (page_end - cell_offset) as u64)
        .read_to_end(&mut cell)
        .map_err(DecodeError::io("cell", cell_offset as u64))?;

    decode_cell(Bytes::from(cell), cell_offset)
}

/// Decode a table-leaf cell held in memory, `cell_offset` being its position in the page.
pub fn decode_cell(cell: Bytes, cell_offset: usize) -> Result<DecodedRow> {
    let mut cursor = CellCursor::new(cell, cell_offset);

    let (payload_length, _) = cursor.varint()?;
    let (rowid, _) = cursor.varint()?;

    // The header length counts its own varint.
    let record_start = cursor.position();
    let (header_length, _) = cursor.varint()?;
    let varint_size = encoded_size(header_length);
    let malformed = || DecodeError::MalformedHeader {
        offset: record_start,
        header_length,
        varint_size,
    };
    if header_length < varint_size as u64 {
        return Err(malformed());
    }

    let mut consumed = varint_size as u64;
    let mut serial_types = Vec::new();
    while consumed < header_length {
        let (serial_type, _) = cursor.varint()?;
        consumed += encoded_size(serial_type) as u64;
        serial_types.push(serial_type);
    }
    if consumed != header_length {
        return Err(malformed());
    }

    let mut columns = Vec::with_capacity(serial_types.len());
    let mut end: usize = 0;
    for &serial_type in &serial_types {
        let Some(size) = column_size(serial_type) else {
            break;
        };
        let next = end.checked_add(size).ok_or_else(&malformed)?;
        columns.push(end..next);
        end = next;
    }
    let body = cursor.split_to(end)?;

    trace!(cell_offset, rowid, ?serial_types, "decoded cell");

    Ok(DecodedRow {
        payload_length,
        rowid,
        serial_types,
        columns,
        body,
    })
}
