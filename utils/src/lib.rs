use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Create a BufReader that reads from a file denoted by its path
pub fn open_read(pb: &Path) -> Result<BufReader<File>> {
    let file = OpenOptions::new()
        .read(true)
        .open(pb)
        .with_context(|| format!("Failed to open file \"{}\" for reading", pb.display()))?;
    Ok(BufReader::new(file))
}

/// Create a BufWriter that writes to a file denoted by its path.
/// The file is created if it does not exist and truncated if it does.
pub fn open_write(pb: &Path) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(pb)
        .with_context(|| format!("Failed to open file \"{}\" for writing", pb.display()))?;
    Ok(BufWriter::new(file))
}

/// Read a one-item-per-line file, trimming every line and skipping blank ones
pub fn read_list(pb: &Path) -> Result<Vec<String>> {
    let reader = open_read(pb)?;
    let mut items = Vec::new();

    for line in reader.lines() {
        let line = line.with_context(|| format!("Error reading line from {}", pb.display()))?;
        let item = line.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }
    }

    Ok(items)
}

pub fn now() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

pub fn now_str() -> String {
    let n = now() / 1000;
    let dt: DateTime<Utc> = SystemTime::now().into();
    format!("{} ({})", n, dt.format("%Y-%m-%d %H:%M:%S"))
}

/// Install the stderr logger. Defaults to `info`, overridable through `RUST_LOG`.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "[{}] {} - {}", now_str(), record.level(), record.args())
        })
        .init();
}
