//! Trade signal CSV output.
//!
//! The execution platform tails a CSV file with a fixed header. Entries
//! carry all three prices; stop moves and closes reuse the same columns
//! with the unused ones left empty.

use crate::error::AppResult;
use chrono::{DateTime, Utc};
use fvg_core::{Direction, Price};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const HEADER: &str = "DateTime,Direction,Entry_Price,Stop_Loss,Target";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Appends signal rows to the output CSV.
pub struct SignalWriter {
    path: PathBuf,
}

impl SignalWriter {
    /// Open the writer, creating the file (or repairing a wrong
    /// header) as needed.
    pub fn new(path: impl Into<PathBuf>) -> AppResult<Self> {
        let writer = Self { path: path.into() };
        writer.ensure_header()?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an accepted entry signal.
    pub fn write_entry(
        &self,
        time: DateTime<Utc>,
        direction: Direction,
        entry: Price,
        stop: Price,
        target: Price,
    ) -> AppResult<()> {
        self.append_row(
            time,
            &direction.to_string(),
            &entry.to_string(),
            &stop.to_string(),
            &target.to_string(),
        )?;
        info!(%direction, %entry, %stop, %target, "signal written");
        Ok(())
    }

    /// Append a stop adjustment for the open position.
    pub fn write_stop_move(
        &self,
        time: DateTime<Utc>,
        direction: Direction,
        new_stop: Price,
    ) -> AppResult<()> {
        self.append_row(time, "MOVE_STOP", "", &new_stop.to_string(), "")?;
        info!(%direction, %new_stop, "stop move written");
        Ok(())
    }

    /// Append a market close (full or partial) for the open position.
    pub fn write_close(
        &self,
        time: DateTime<Utc>,
        direction: Direction,
        price: Price,
        quantity: u32,
        reason: &str,
    ) -> AppResult<()> {
        self.append_row(time, "CLOSE", &price.to_string(), "", "")?;
        info!(%direction, %price, quantity, reason, "close written");
        Ok(())
    }

    fn append_row(
        &self,
        time: DateTime<Utc>,
        direction: &str,
        entry: &str,
        stop: &str,
        target: &str,
    ) -> AppResult<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(
            file,
            "{},{},{},{},{}",
            time.format(TIME_FORMAT),
            direction,
            entry,
            stop,
            target
        )?;
        Ok(())
    }

    /// Make sure the file exists and starts with the expected header.
    /// A file with a foreign header is rewritten; the platform cannot
    /// parse mixed layouts.
    fn ensure_header(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let valid = match std::fs::File::open(&self.path) {
            Ok(file) => {
                let mut first_line = String::new();
                BufReader::new(file).read_line(&mut first_line)?;
                first_line.trim_end() == HEADER
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => false,
            Err(err) => return Err(err.into()),
        };
        if !valid {
            warn!(path = %self.path.display(), "initializing signal file");
            std::fs::write(&self.path, format!("{HEADER}\n"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signals.csv");
        let writer = SignalWriter::new(&path).unwrap();
        writer
            .write_entry(
                Utc::now(),
                Direction::Long,
                Price::new(dec!(14710)),
                Price::new(dec!(14690)),
                Price::new(dec!(14770)),
            )
            .unwrap();

        // Re-opening must not truncate existing rows.
        let writer = SignalWriter::new(&path).unwrap();
        writer
            .write_close(Utc::now(), Direction::Long, Price::new(dec!(14770)), 3, "target")
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("LONG"));
        assert!(lines[2].contains("CLOSE"));
    }

    #[test]
    fn test_foreign_header_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signals.csv");
        std::fs::write(&path, "Time,Side\n1,2\n").unwrap();
        let _writer = SignalWriter::new(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(HEADER));
        assert!(!content.contains("Side"));
    }
}
