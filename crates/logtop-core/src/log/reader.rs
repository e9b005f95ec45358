use super::discovery::LogFile;
use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

pub struct LogReader;

impl LogReader {
    /// Open a discovered log, decompressing it on the fly if it is gzipped
    pub fn open(log: &LogFile) -> Result<Box<dyn BufRead>> {
        Self::open_path(&log.path, log.compressed)
    }

    /// Open an arbitrary file, choosing the decoder from its `.gz` extension
    pub fn open_file(path: &Path) -> Result<Box<dyn BufRead>> {
        let compressed = path.extension().is_some_and(|ext| ext == "gz");
        Self::open_path(path, compressed)
    }

    fn open_path(path: &Path, compressed: bool) -> Result<Box<dyn BufRead>> {
        tracing::debug!(
            "Opening log {} (gzip: {})",
            path.display(),
            compressed
        );

        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::SourceNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        if compressed {
            Ok(Box::new(BufReader::new(GzDecoder::new(file))))
        } else {
            Ok(Box::new(BufReader::new(file)))
        }
    }

    /// Iterate over the raw lines of a log, without their line terminators
    ///
    /// Lines are not decoded here: a line that is not valid UTF-8 is
    /// rejected by [`Accumulator::ingest_bytes`](crate::analysis::Accumulator::ingest_bytes)
    /// as a parse failure.
    pub fn lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<Vec<u8>>> {
        reader.split(b'\n').map(|chunk| {
            chunk.map(|mut bytes| {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                bytes
            })
        })
    }
}
