//! SQLite schema table parsing.
//!
//! Page 1 holds the root of the `sqlite_schema` table, whose rows have the
//! columns type, name, tbl_name, rootpage, sql.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use super::constants::{
    PAGE_HEADER_SIZE, PAGE1_HEADER_OFFSET, SCHEMA_NAME_COLUMN, SCHEMA_ROOTPAGE_COLUMN,
    SCHEMA_SQL_COLUMN, SCHEMA_TBL_NAME_COLUMN, SCHEMA_TYPE_COLUMN,
};
use super::error::{DecodeError, Result};
use super::header::{read_database_header, read_page_header};
use super::page::{DecodedRow, read_cell, read_cell_pointers};

/// Summary metadata answered by `.dbinfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbInfo {
    pub page_size: u16,
    /// Cell count of the root page, one per `sqlite_schema` row.
    pub table_count: u16,
}

/// An entry from the sqlite_schema table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub entry_type: String,
    pub name: String,
    pub tbl_name: String,
    pub rootpage: u32,
    pub sql: Option<String>,
}

impl SchemaEntry {
    fn from_row(row: &DecodedRow) -> Result<Self> {
        let sql = if row.is_null(SCHEMA_SQL_COLUMN)? {
            None
        } else {
            Some(row.text(SCHEMA_SQL_COLUMN)?)
        };

        let rootpage = row.integer(SCHEMA_ROOTPAGE_COLUMN)?;
        let rootpage = u32::try_from(rootpage).map_err(|_| DecodeError::ValueOutOfRange {
            column: SCHEMA_ROOTPAGE_COLUMN,
            value: rootpage,
        })?;

        Ok(Self {
            entry_type: row.text(SCHEMA_TYPE_COLUMN)?,
            name: row.text(SCHEMA_NAME_COLUMN)?,
            tbl_name: row.text(SCHEMA_TBL_NAME_COLUMN)?,
            rootpage,
            sql,
        })
    }
}

/// Read the page size and the root page's cell count.
pub fn db_info<R: Read + Seek>(file: &mut R) -> Result<DbInfo> {
    let header = read_database_header(file)?;
    let page = read_page_header(file, PAGE1_HEADER_OFFSET as u64)?;

    Ok(DbInfo {
        page_size: header.page_size,
        table_count: page.cell_count,
    })
}

/// Decode every cell of the root page, in cell pointer order.
fn root_rows<R: Read + Seek>(file: &mut R) -> Result<Vec<DecodedRow>> {
    let header = read_database_header(file)?;
    let page = read_page_header(file, PAGE1_HEADER_OFFSET as u64)?;
    let page_end = header.page_size_bytes() as usize;

    let pointers = read_cell_pointers(
        file,
        (PAGE1_HEADER_OFFSET + PAGE_HEADER_SIZE) as u64,
        page.cell_count,
    )?;

    pointers
        .into_iter()
        .map(|offset| read_cell(file, offset, page_end))
        .collect()
}

/// Table names from the root page, in cell order.
///
/// Each name is the row's tbl_name column; for table rows it equals name.
pub fn list_tables<R: Read + Seek>(file: &mut R) -> Result<Vec<String>> {
    let names = root_rows(file)?
        .iter()
        .map(|row| row.text(SCHEMA_TBL_NAME_COLUMN))
        .collect::<Result<Vec<_>>>()?;

    debug!(count = names.len(), "listed tables");
    Ok(names)
}

/// Read all schema entries from the root page.
pub fn read_schema<R: Read + Seek>(file: &mut R) -> Result<Vec<SchemaEntry>> {
    root_rows(file)?.iter().map(SchemaEntry::from_row).collect()
}

/// Open the database read-only and read its summary metadata.
pub fn read_db_info(path: impl AsRef<Path>) -> anyhow::Result<DbInfo> {
    let mut file = File::open(path).context("Failed to open database file")?;
    Ok(db_info(&mut file)?)
}

/// Open the database read-only and read its table names.
pub fn read_table_names(path: impl AsRef<Path>) -> anyhow::Result<Vec<String>> {
    let mut file = File::open(path).context("Failed to open database file")?;
    Ok(list_tables(&mut file)?)
}
