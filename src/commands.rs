use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::db;

/// Commands understood by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    DbInfo,
    Tables,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(command: &str) -> Result<Self> {
        match command {
            ".dbinfo" => Ok(Command::DbInfo),
            ".tables" | ".table" => Ok(Command::Tables),
            _ => bail!("Missing or invalid command passed: {}", command),
        }
    }
}

impl Command {
    pub fn run(self, path: &str, out: &mut impl Write) -> Result<()> {
        match self {
            Command::DbInfo => dbinfo(path, out),
            Command::Tables => tables(path, out),
        }
    }
}

pub fn dbinfo(path: &str, out: &mut impl Write) -> Result<()> {
    let info = db::read_db_info(path).context("Failed to read database info")?;
    writeln!(out, "database page size: {}", info.page_size)?;
    writeln!(out, "number of tables: {}", info.table_count)?;
    Ok(())
}

pub fn tables(path: &str, out: &mut impl Write) -> Result<()> {
    let table_names = db::read_table_names(path).context("Failed to read table names")?;
    for name in &table_names {
        write!(out, "{} ", name)?;
    }
    writeln!(out)?;
    Ok(())
}
