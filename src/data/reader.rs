//! Memory-mapped tick reader
//!
//! Maps the quote file once and parses records lazily, so a multi-gigabyte
//! file costs no more to open than a small one.

use super::Tick;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from opening a data file
#[derive(Debug, Error)]
pub enum DataError {
    /// File missing, unreadable, empty, or the mapping failed
    #[error("failed to map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Streams `Tick`s out of a memory-mapped CSV file.
///
/// Expected format: one header line, then `timestamp,bid,ask,volume`
/// records. Blank and malformed lines are skipped. Ticks are yielded by
/// value and never borrow the mapping.
pub struct TickReader {
    mmap: Mmap,
    pos: usize,
    path: PathBuf,
}

impl TickReader {
    /// Map the file read-only and position the cursor past the header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path).map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;
        // SAFETY: the mapping is read-only and private to this reader; we
        // never yield references into it.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;

        let mut reader = Self {
            mmap,
            pos: 0,
            path,
        };
        reader.skip_header();
        Ok(reader)
    }

    /// Reposition just past the header for a second pass. Does not re-map.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.skip_header();
    }

    /// Rough record count from file size, for preallocation only.
    pub fn approximate_tick_count(&self) -> usize {
        // Average line in this format runs ~50 bytes
        self.mmap.len() / 50
    }

    /// Path this reader was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn skip_header(&mut self) {
        if let Some(nl) = find_newline(&self.mmap[..]) {
            self.pos = nl + 1;
        }
    }

    fn parse_line(line: &[u8]) -> Option<Tick> {
        let line = std::str::from_utf8(line).ok()?;
        let mut fields = line.split(',');

        let timestamp = fields.next()?.trim().parse().ok()?;
        let bid = fields.next()?.trim().parse().ok()?;
        let ask = fields.next()?.trim().parse().ok()?;
        let volume = fields.next()?.trim().parse().ok()?;

        Some(Tick {
            timestamp,
            bid,
            ask,
            volume,
        })
    }
}

impl Iterator for TickReader {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        let data = &self.mmap[..];
        while self.pos < data.len() {
            let rest = &data[self.pos..];
            // The final line may lack a trailing newline
            let line_end = find_newline(rest).unwrap_or(rest.len());
            let mut line = &rest[..line_end];
            self.pos += line_end + 1;

            if let [head @ .., b'\r'] = line {
                line = head;
            }
            if line.is_empty() {
                continue;
            }
            if let Some(tick) = Self::parse_line(line) {
                return Some(tick);
            }
            // Malformed line: skip and keep going
        }
        None
    }
}

fn find_newline(data: &[u8]) -> Option<usize> {
    data.iter().position(|&b| b == b'\n')
}
