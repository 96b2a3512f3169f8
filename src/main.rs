use anyhow::{Result, bail};
use tracing_subscriber::EnvFilter;

use sqlite_schema_reader::commands::Command;

fn main() -> Result<()> {
    // Diagnostics go to stderr so stdout stays the command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Parse arguments
    let args = std::env::args().collect::<Vec<_>>();
    match args.len() {
        0 | 1 => bail!("Missing <database path> and <command>"),
        2 => bail!("Missing <command>"),
        _ => {}
    }

    // Parse command and act accordingly
    let command: Command = args[2].parse()?;
    let stdout = std::io::stdout();
    command.run(&args[1], &mut stdout.lock())?;

    Ok(())
}
