//! Errors raised while decoding the on-disk format.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error reading {what} at offset {offset}: {source}")]
    Io {
        what: &'static str,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Malformed record header at offset {offset}: header length {header_length}, varint size {varint_size}"
    )]
    MalformedHeader {
        offset: usize,
        header_length: u64,
        varint_size: usize,
    },

    #[error("Varint at offset {offset} ran out of input after {consumed} bytes")]
    TruncatedVarint { offset: usize, consumed: usize },

    #[error("Truncated data at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unsupported serial type {serial_type} in column {column}")]
    UnsupportedSerialType { column: usize, serial_type: u64 },

    #[error("Value {value} in column {column} is out of range")]
    ValueOutOfRange { column: usize, value: i64 },

    #[error("Column {column} requested but the record only has {columns} columns")]
    SchemaMismatch { column: usize, columns: usize },
}

impl DecodeError {
    pub(crate) fn io(what: &'static str, offset: u64) -> impl FnOnce(std::io::Error) -> Self {
        move |source| DecodeError::Io {
            what,
            offset,
            source,
        }
    }
}
