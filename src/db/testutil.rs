//! Builders for crafted database images used by the unit tests.

use super::constants::{DB_HEADER_SIZE, HEADER_MAGIC, PAGE_HEADER_SIZE, PAGE_SIZE_OFFSET};
use super::varint::encoded_size;

/// SQLite varint encoding of `value`.
pub fn encode_varint(value: u64) -> Vec<u8> {
    if value > 0x00ff_ffff_ffff_ffff {
        let mut out = vec![0u8; 9];
        out[8] = value as u8;
        let mut rest = value >> 8;
        for byte in out[..8].iter_mut().rev() {
            *byte = (rest & 0x7f) as u8 | 0x80;
            rest >>= 7;
        }
        return out;
    }

    let mut groups = Vec::new();
    let mut rest = value;
    loop {
        groups.push((rest & 0x7f) as u8);
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    groups.reverse();
    let last = groups.len() - 1;
    for byte in &mut groups[..last] {
        *byte |= 0x80;
    }
    groups
}

/// A column value to lay out in a crafted record.
#[derive(Debug, Clone)]
pub enum Column<'a> {
    Null,
    Int(i64),
    Text(&'a str),
    /// An explicit serial type followed by raw value bytes.
    Raw(u64, Vec<u8>),
}

impl Column<'_> {
    fn serial_type_and_bytes(&self) -> (u64, Vec<u8>) {
        match self {
            Column::Null => (0, Vec::new()),
            Column::Int(0) => (8, Vec::new()),
            Column::Int(1) => (9, Vec::new()),
            Column::Int(v) => {
                let v = *v;
                let (serial_type, width) = if i8::try_from(v).is_ok() {
                    (1, 1)
                } else if i16::try_from(v).is_ok() {
                    (2, 2)
                } else if (-(1 << 23)..(1 << 23)).contains(&v) {
                    (3, 3)
                } else if i32::try_from(v).is_ok() {
                    (4, 4)
                } else if (-(1 << 47)..(1 << 47)).contains(&v) {
                    (5, 6)
                } else {
                    (6, 8)
                };
                (serial_type, v.to_be_bytes()[8 - width..].to_vec())
            }
            Column::Text(s) => (s.len() as u64 * 2 + 13, s.as_bytes().to_vec()),
            Column::Raw(serial_type, bytes) => (*serial_type, bytes.clone()),
        }
    }
}

/// Encode a record: header length varint, serial types, then values.
pub fn record(columns: &[Column<'_>]) -> Vec<u8> {
    let mut types = Vec::new();
    let mut values = Vec::new();
    for column in columns {
        let (serial_type, bytes) = column.serial_type_and_bytes();
        types.extend(encode_varint(serial_type));
        values.extend(bytes);
    }

    let mut header_length = types.len() as u64 + 1;
    while encoded_size(header_length) as u64 + types.len() as u64 != header_length {
        header_length = types.len() as u64 + encoded_size(header_length) as u64;
    }

    let mut out = encode_varint(header_length);
    out.extend(types);
    out.extend(values);
    out
}

/// Encode a table-leaf cell: payload length, rowid, record.
pub fn table_leaf_cell(rowid: u64, columns: &[Column<'_>]) -> Vec<u8> {
    let payload = record(columns);
    let mut out = encode_varint(payload.len() as u64);
    out.extend(encode_varint(rowid));
    out.extend(payload);
    out
}

/// A `sqlite_schema` row describing an ordinary table.
pub fn schema_table_cell(rowid: u64, name: &str, rootpage: i64) -> Vec<u8> {
    let sql = format!("CREATE TABLE {name} (id integer primary key, name text)");
    table_leaf_cell(
        rowid,
        &[
            Column::Text("table"),
            Column::Text(name),
            Column::Text(name),
            Column::Int(rootpage),
            Column::Text(&sql),
        ],
    )
}

/// Builds page 1 of a database: file header, leaf page header, cell
/// pointers and cells packed from the end of the page.
pub struct DatabaseBuilder {
    page_size: u16,
    cells: Vec<Vec<u8>>,
}

impl DatabaseBuilder {
    pub fn new(page_size: u16) -> Self {
        Self {
            page_size,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, cell: Vec<u8>) -> Self {
        self.cells.push(cell);
        self
    }

    pub fn tables(mut self, names: &[&str]) -> Self {
        for name in names {
            let rowid = self.cells.len() as u64 + 1;
            self.cells
                .push(schema_table_cell(rowid, name, rowid as i64 + 1));
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        let page_size = self.page_size as usize;
        let mut page = vec![0u8; page_size];

        page[..16].copy_from_slice(HEADER_MAGIC);
        page[PAGE_SIZE_OFFSET..PAGE_SIZE_OFFSET + 2].copy_from_slice(&self.page_size.to_be_bytes());
        page[18] = 1;
        page[19] = 1;
        page[21] = 64;
        page[22] = 32;
        page[23] = 32;
        page[28..32].copy_from_slice(&1u32.to_be_bytes());
        page[56..60].copy_from_slice(&1u32.to_be_bytes());

        let mut content_start = page_size;
        let mut pointers = Vec::new();
        for cell in &self.cells {
            content_start -= cell.len();
            page[content_start..content_start + cell.len()].copy_from_slice(cell);
            pointers.push(content_start as u16);
        }

        let header = DB_HEADER_SIZE;
        page[header] = 0x0d;
        page[header + 3..header + 5].copy_from_slice(&(self.cells.len() as u16).to_be_bytes());
        page[header + 5..header + 7].copy_from_slice(&(content_start as u16).to_be_bytes());

        let array = header + PAGE_HEADER_SIZE;
        for (i, pointer) in pointers.iter().enumerate() {
            page[array + i * 2..array + i * 2 + 2].copy_from_slice(&pointer.to_be_bytes());
        }

        page
    }
}
