//! Database header and b-tree page header parsing for SQLite format.

use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, warn};

use super::constants::{
    CELL_CONTENT_OFFSET, CELL_COUNT_OFFSET, CHANGE_COUNTER_OFFSET, DATABASE_SIZE_OFFSET,
    DB_HEADER_SIZE, FIRST_FREEBLOCK_OFFSET, FRAGMENTED_BYTES_OFFSET, HEADER_MAGIC,
    PAGE_HEADER_SIZE, PAGE_SIZE_MAX, PAGE_SIZE_MAX_MARKER, PAGE_SIZE_OFFSET, PAGE_TYPE_OFFSET,
    READ_VERSION_OFFSET, RESERVED_SPACE_OFFSET, TEXT_ENCODING_OFFSET, WRITE_VERSION_OFFSET,
};
use super::error::{DecodeError, Result};

/// The fixed 100-byte header at the start of the database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHeader {
    pub magic: [u8; 16],
    /// Page size exactly as stored; see [`DatabaseHeader::page_size_bytes`].
    pub page_size: u16,
    pub write_version: u8,
    pub read_version: u8,
    pub reserved_space: u8,
    pub file_change_counter: u32,
    pub database_size_pages: u32,
    pub text_encoding: u32,
}

impl DatabaseHeader {
    fn parse(header: &[u8; DB_HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 16];
        magic.copy_from_slice(&header[..16]);

        Self {
            magic,
            page_size: be_u16(header, PAGE_SIZE_OFFSET),
            write_version: header[WRITE_VERSION_OFFSET],
            read_version: header[READ_VERSION_OFFSET],
            reserved_space: header[RESERVED_SPACE_OFFSET],
            file_change_counter: be_u32(header, CHANGE_COUNTER_OFFSET),
            database_size_pages: be_u32(header, DATABASE_SIZE_OFFSET),
            text_encoding: be_u32(header, TEXT_ENCODING_OFFSET),
        }
    }

    /// Page size in bytes. The stored value 1 means 65536, which does not fit in a u16.
    pub fn page_size_bytes(&self) -> u32 {
        if self.page_size == PAGE_SIZE_MAX_MARKER {
            PAGE_SIZE_MAX
        } else {
            self.page_size as u32
        }
    }

    pub fn has_valid_magic(&self) -> bool {
        &self.magic == HEADER_MAGIC
    }
}

/// B-tree page kinds, keyed by the flag byte at the start of the page header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    IndexInterior,
    TableInterior,
    IndexLeaf,
    TableLeaf,
}

impl PageType {
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0x02 => Some(PageType::IndexInterior),
            0x05 => Some(PageType::TableInterior),
            0x0a => Some(PageType::IndexLeaf),
            0x0d => Some(PageType::TableLeaf),
            _ => None,
        }
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, PageType::IndexLeaf | PageType::TableLeaf)
    }
}

/// The 8-byte header of a leaf b-tree page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Raw page type flag; see [`PageHeader::page_type`].
    pub page_type_flag: u8,
    pub first_freeblock: u16,
    pub cell_count: u16,
    pub cell_content_start: u16,
    pub fragmented_free_bytes: u8,
}

impl PageHeader {
    fn parse(header: &[u8; PAGE_HEADER_SIZE]) -> Self {
        Self {
            page_type_flag: header[PAGE_TYPE_OFFSET],
            first_freeblock: be_u16(header, FIRST_FREEBLOCK_OFFSET),
            cell_count: be_u16(header, CELL_COUNT_OFFSET),
            cell_content_start: be_u16(header, CELL_CONTENT_OFFSET),
            fragmented_free_bytes: header[FRAGMENTED_BYTES_OFFSET],
        }
    }

    pub fn page_type(&self) -> Option<PageType> {
        PageType::from_flag(self.page_type_flag)
    }

    /// Start of the cell content area; a stored zero means 65536.
    pub fn cell_content_start_bytes(&self) -> u32 {
        match self.cell_content_start {
            0 => PAGE_SIZE_MAX,
            n => n as u32,
        }
    }
}

/// Read the 100-byte database header from the start of the file.
///
/// The page size is stored at byte offset 16-17 as a 2-byte big-endian
/// integer.
///
/// # Arguments
///
/// * `file` - The opened database file
///
/// # Returns
///
/// Returns the decoded header, or an I/O error if the file is shorter than 100 bytes.
pub fn read_database_header<R: Read + Seek>(file: &mut R) -> Result<DatabaseHeader> {
    let mut header = [0u8; DB_HEADER_SIZE];
    read_exact_at(file, 0, &mut header, "database header")?;
    let header = DatabaseHeader::parse(&header);

    if !header.has_valid_magic() {
        warn!(magic = ?header.magic, "database header magic does not match SQLite format 3");
    }
    if header.page_size == PAGE_SIZE_MAX_MARKER {
        warn!("page size stored as 1, treating as {PAGE_SIZE_MAX}");
    }
    debug!(page_size = header.page_size, "read database header");

    Ok(header)
}

/// Read the b-tree page header starting at `page_offset` (absolute file offset).
///
/// For the root page this is 100, right after the database header.
///
/// # Arguments
///
/// * `file` - The opened database file
/// * `page_offset` - Absolute file offset of the page header
///
/// # Returns
///
/// Returns the decoded page header, or an I/O error on a short read.
pub fn read_page_header<R: Read + Seek>(file: &mut R, page_offset: u64) -> Result<PageHeader> {
    let mut header = [0u8; PAGE_HEADER_SIZE];
    read_exact_at(file, page_offset, &mut header, "page header")?;
    let header = PageHeader::parse(&header);

    match header.page_type() {
        Some(kind) if kind.is_leaf() => {}
        Some(kind) => warn!(?kind, page_offset, "interior pages are not traversed"),
        None => warn!(flag = header.page_type_flag, page_offset, "unknown b-tree page type"),
    }
    debug!(page_offset, cell_count = header.cell_count, "read page header");

    Ok(header)
}

/// Seek to `offset` and fill `buf`, mapping any failure (including a short read) to an I/O error.
pub(crate) fn read_exact_at<R: Read + Seek>(
    file: &mut R,
    offset: u64,
    buf: &mut [u8],
    what: &'static str,
) -> Result<()> {
    file.seek(SeekFrom::Start(offset))
        .map_err(DecodeError::io(what, offset))?;
    file.read_exact(buf).map_err(DecodeError::io(what, offset))
}

fn be_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn be_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
