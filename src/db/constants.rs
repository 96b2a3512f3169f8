//! Constants used throughout the SQLite database parsing.

/// Size of the database header (on page 1).
pub const DB_HEADER_SIZE: usize = 100;

/// Magic string at the very start of every SQLite database file.
pub const HEADER_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Offset of page size in database header.
pub const PAGE_SIZE_OFFSET: usize = 16;

/// Stored page size value that stands for 65536.
pub const PAGE_SIZE_MAX_MARKER: u16 = 1;
pub const PAGE_SIZE_MAX: u32 = 65536;

pub const WRITE_VERSION_OFFSET: usize = 18;
pub const READ_VERSION_OFFSET: usize = 19;
pub const RESERVED_SPACE_OFFSET: usize = 20;
pub const CHANGE_COUNTER_OFFSET: usize = 24;
pub const DATABASE_SIZE_OFFSET: usize = 28;
pub const TEXT_ENCODING_OFFSET: usize = 56;

/// The page header on page 1 begins right after the database header.
pub const PAGE1_HEADER_OFFSET: usize = DB_HEADER_SIZE;

/// Size of a leaf b-tree page header.
pub const PAGE_HEADER_SIZE: usize = 8;

pub const PAGE_TYPE_OFFSET: usize = 0;
pub const FIRST_FREEBLOCK_OFFSET: usize = 1;

/// Offset of cell count in page header.
pub const CELL_COUNT_OFFSET: usize = 3;

pub const CELL_CONTENT_OFFSET: usize = 5;
pub const FRAGMENTED_BYTES_OFFSET: usize = 7;

/// Width of one entry in the cell pointer array.
pub const CELL_POINTER_SIZE: usize = 2;

// sqlite_schema column indices
pub const SCHEMA_TYPE_COLUMN: usize = 0;
pub const SCHEMA_NAME_COLUMN: usize = 1;
pub const SCHEMA_TBL_NAME_COLUMN: usize = 2;
pub const SCHEMA_ROOTPAGE_COLUMN: usize = 3;
pub const SCHEMA_SQL_COLUMN: usize = 4;
