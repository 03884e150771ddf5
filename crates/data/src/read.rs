use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::path::PathBuf;
use std::str;
use std::time::Duration;
use std::vec;

use tracing::debug;
use tracing::trace;

use crate::error::ScanError;
use crate::filter::TimeRange;
use crate::record;
use crate::record::DataRecord;

/// Counters collected while reading data files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files opened.
    pub files: usize,
    /// Lines read, whatever their content.
    pub lines: usize,
    /// Lines skipped because they are not valid UTF-8.
    pub undecodable_lines: usize,
    /// Lines skipped because they do not start with a timestamp.
    pub unparseable_lines: usize,
    /// Records within the time range.
    pub records: usize,
    pub elapsed: Duration,
}

impl ScanSummary {
    pub fn records_per_sec(&self) -> u64 {
        let elapsed_ms = self.elapsed.as_millis().max(1);
        (self.records as u128 * 1000 / elapsed_ms) as u64
    }
}

/// An iterator that reads data files in the given order and yields the
/// records whose timestamp is within a [`TimeRange`].
///
/// Files are opened lazily, one at a time, and each file is closed before the
/// next one is opened. Lines that are not valid UTF-8 or have no timestamp are
/// skipped. An I/O error is yielded once and reading resumes with the next
/// file.
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Debug)]
pub struct Records {
    files: vec::IntoIter<PathBuf>,
    current: Option<DataFile>,
    range: TimeRange,
    summary: ScanSummary,
}

impl Records {
    pub fn new(files: Vec<PathBuf>, range: TimeRange) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
            range,
            summary: ScanSummary::default(),
        }
    }

    /// The counters of the lines read so far.
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    fn close_current(&mut self) {
        if let Some(file) = self.current.take() {
            debug!(path = %file.path.display(), lines = file.lines_read, "finished reading data file");
        }
    }
}

impl Iterator for Records {
    type Item = Result<DataRecord, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let file = match self.current {
                Some(ref mut file) => file,
                None => {
                    let path = self.files.next()?;
                    match DataFile::open(path) {
                        Ok(file) => {
                            self.summary.files += 1;
                            self.current = Some(file);
                            continue;
                        }
                        Err(error) => return Some(Err(error)),
                    }
                }
            };

            let line = match file.next_line() {
                Some(Ok(line)) => line,
                Some(Err(error)) => {
                    self.close_current();
                    return Some(Err(error));
                }
                None => {
                    self.close_current();
                    continue;
                }
            };

            self.summary.lines += 1;

            let Ok(line) = str::from_utf8(&line) else {
                trace!(line = self.summary.lines, "skipping line that is not valid UTF-8");
                self.summary.undecodable_lines += 1;
                continue;
            };

            let Some(record) = record::parse_record(line) else {
                trace!(line, "skipping line without a timestamp");
                self.summary.unparseable_lines += 1;
                continue;
            };

            if self.range.contains(record.epoch_ms) {
                self.summary.records += 1;
                return Some(Ok(record));
            }
        }
    }
}

/// A data file opened for reading.
#[derive(Debug)]
struct DataFile {
    path: PathBuf,
    lines: LineReader<BufReader<File>>,
    lines_read: usize,
}

impl DataFile {
    fn open(path: PathBuf) -> Result<Self, ScanError> {
        match File::open(&path) {
            Ok(file) => Ok(Self {
                path,
                lines: LineReader::new(BufReader::new(file)),
                lines_read: 0,
            }),
            Err(source) => Err(ScanError::Open { path, source }),
        }
    }

    fn next_line(&mut self) -> Option<Result<Vec<u8>, ScanError>> {
        match self.lines.next()? {
            Ok(line) => {
                self.lines_read += 1;
                Some(Ok(line))
            }
            Err(source) => Some(Err(ScanError::Read {
                path: self.path.clone(),
                source,
            })),
        }
    }
}

/// An iterator that yields the raw bytes of each line from an underlying
/// [`BufRead`], without the `\n` or `\r\n` terminator.
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Debug)]
pub(crate) struct LineReader<R> {
    reader: R,
}

impl<R> LineReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<Vec<u8>, io::Error>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();

        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                }
                Some(Ok(line))
            }
            Err(error) => Some(Err(error)),
        }
    }
}
