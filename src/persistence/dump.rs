//! Text Dump Persistence
//!
//! Line-oriented snapshot of the level-0 chain.
//!
//! File format, one record per line:
//!
//! ```text
//! <key><delimiter><value>\n
//! ```
//!
//! Only the first delimiter is significant, so values may contain it.
//! A trailing `\r` is tolerated. Lines that are not UTF-8, lack a
//! delimiter, have an empty key or value, or whose key or value fails to
//! parse are skipped on load.

use std::fmt::{Debug, Display};
use std::fs::{self, File};
use std::hash::Hash;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::storage::{InsertOutcome, SkipList};

/// Encodes and splits `key<delimiter>value` records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCodec {
    delimiter: String,
}

impl LineCodec {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Write one record, newline included
    pub fn encode<W, K, V>(&self, writer: &mut W, key: &K, value: &V) -> std::io::Result<()>
    where
        W: Write,
        K: Display,
        V: Display,
    {
        writeln!(writer, "{}{}{}", key, self.delimiter, value)
    }

    /// Split a record at the first delimiter; `None` for malformed lines
    pub fn decode<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let (key, value) = line.split_once(self.delimiter.as_str())?;
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some((key, value))
    }
}

/// Outcome of loading a dump
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Records that created a new entry
    pub inserted: usize,
    /// Records whose key was already live (value left untouched)
    pub existing: usize,
    /// Malformed or unparsable lines
    pub skipped: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.inserted + self.existing + self.skipped
    }
}

impl<K, V> SkipList<K, V>
where
    K: Ord + Hash + Clone + Debug + Display,
    V: Clone + Debug + Display,
{
    fn codec(&self) -> LineCodec {
        LineCodec::new(self.config().delimiter.as_str())
    }

    /// Write every entry in ascending key order, regardless of expiry.
    ///
    /// Returns the number of records written.
    pub fn dump_to<W: Write>(&self, writer: W) -> Result<usize> {
        let codec = self.codec();
        let entries = self.entries();
        let mut writer = BufWriter::new(writer);

        for (key, value) in &entries {
            codec.encode(&mut writer, key, value)?;
        }
        writer.flush()?;

        debug!(records = entries.len(), "Dumped entries");
        Ok(entries.len())
    }

    /// Dump to `path`, creating parent directories as needed
    pub fn dump_to_path(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let count = self.dump_to(File::create(path)?)?;
        info!(path = %path.display(), records = count, "Dump file written");
        Ok(count)
    }

    /// Dump to the configured store path
    pub fn dump_file(&self) -> Result<usize> {
        let path = self.config().store_path.clone();
        self.dump_to_path(path)
    }
}

impl<K, V> SkipList<K, V>
where
    K: Ord + Hash + Clone + Debug + FromStr,
    V: Clone + Debug + FromStr,
{
    /// Re-insert every well-formed record read from `reader`.
    ///
    /// Keys already present keep their live value.
    pub fn load_from<R: BufRead>(&self, mut reader: R) -> Result<LoadReport> {
        let codec = LineCodec::new(self.config().delimiter.as_str());
        let mut report = LoadReport::default();
        let mut buf = Vec::new();
        let mut lineno = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            lineno += 1;

            let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

            let Ok(line) = std::str::from_utf8(raw) else {
                warn!(line = lineno, "Skipping record that is not valid UTF-8");
                report.skipped += 1;
                continue;
            };

            let Some((raw_key, raw_value)) = codec.decode(line) else {
                debug!(line = lineno, "Skipping malformed record");
                report.skipped += 1;
                continue;
            };

            let (Ok(key), Ok(value)) = (raw_key.parse::<K>(), raw_value.parse::<V>()) else {
                warn!(line = lineno, key = raw_key, "Skipping unparsable record");
                report.skipped += 1;
                continue;
            };

            match self.insert(key, value) {
                InsertOutcome::Inserted => report.inserted += 1,
                InsertOutcome::AlreadyExists => report.existing += 1,
            }
        }

        Ok(report)
    }

    /// Load records from `path`
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        let report = self.load_from(BufReader::new(File::open(path)?))?;
        info!(
            path = %path.display(),
            inserted = report.inserted,
            existing = report.existing,
            skipped = report.skipped,
            "Dump file loaded"
        );
        Ok(report)
    }

    /// Load from the configured store path
    pub fn load_file(&self) -> Result<LoadReport> {
        let path = self.config().store_path.clone();
        self.load_from_path(path)
    }
}
