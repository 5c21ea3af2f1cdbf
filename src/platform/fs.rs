// LogScraper - platform/fs.rs
//
// Filesystem helpers: open a log file as a line-oriented reader, transparently
// decompressing gzip content, and inspect local copies.

use crate::util::constants;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Open `path` for line reading.
///
/// The first two bytes are inspected: files starting with the gzip magic
/// number are decompressed on the fly, anything else is read as plain text.
pub fn open_log_file(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    tracing::info!(file = %path.display(), "Opening file");

    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let is_gzip = match file.read_exact(&mut magic) {
        Ok(()) => magic == constants::GZIP_MAGIC,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e),
    };
    file.seek(SeekFrom::Start(0))?;

    if is_gzip {
        tracing::debug!(file = %path.display(), "Gzip content detected");
        Ok(Box::new(BufReader::with_capacity(
            constants::READ_BUFFER_SIZE,
            MultiGzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(
            constants::READ_BUFFER_SIZE,
            file,
        )))
    }
}

/// Whether a local copy at `path` exists and was modified within `lifetime`.
///
/// Missing files and unreadable mtimes count as stale; a zero lifetime makes
/// every copy stale.
pub fn is_fresh(path: &Path, lifetime: Duration, now: SystemTime) -> bool {
    if lifetime.is_zero() {
        return false;
    }
    let Ok(modified) = std::fs::metadata(path).and_then(|m| m.modified()) else {
        return false;
    };
    match now.checked_sub(lifetime) {
        Some(cutoff) => modified >= cutoff,
        None => true,
    }
}
