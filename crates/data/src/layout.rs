//! The on-disk layout of the logger data files:
//!
//! ```text
//! <base dir>
//!  └── data
//!      └── yyyy_MM_dd
//!          └── <device id>
//!              ├── yyyy_MM_dd_HHmmss.txt
//!              └── yyyy_MM_dd_HHmmss.txt
//! ```
//!
//! A file holds at most [`FILE_INTERVAL_MS`] of data starting from the time in
//! its name. Directory and file names are fixed-width and zero-padded, so
//! comparing them as strings orders them chronologically and files can be
//! selected for a time range without being opened.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Datelike;
use chrono::Utc;
use tracing::debug;
use tracing::warn;

use crate::error::IoResultExt;
use crate::error::ScanError;
use crate::filter::TimeRange;

pub const DATA_DIR: &str = "data";
pub const DEFAULT_FILE_SUFFIX: &str = ".txt";
pub const FILE_INTERVAL_MS: i64 = 10 * 60 * 1000;

const DIR_DATE_FORMAT: &str = "%Y_%m_%d";
const DIR_DATE_WIDTH: usize = "yyyy_MM_dd".len();
const FILE_DATE_FORMAT: &str = "%Y_%m_%d_%H%M%S";
const FILE_DATE_WIDTH: usize = "yyyy_MM_dd_HHmmss".len();

/// The inclusive name bounds of the directories and files for a time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LayoutKeys {
    start_dir: String,
    end_dir: String,
    start_file: String,
    end_file: String,
}

impl LayoutKeys {
    pub(crate) fn new(range: &TimeRange) -> Result<Self, ScanError> {
        let (start, end) = range.file_window();
        let start = to_datetime(start)?;
        let end = to_datetime(end)?;

        Ok(Self {
            start_dir: format_key(start, DIR_DATE_FORMAT, DIR_DATE_WIDTH),
            end_dir: format_key(end, DIR_DATE_FORMAT, DIR_DATE_WIDTH),
            start_file: format_key(start, FILE_DATE_FORMAT, FILE_DATE_WIDTH),
            end_file: format_key(end, FILE_DATE_FORMAT, FILE_DATE_WIDTH),
        })
    }

    #[inline]
    fn by_dir_name(&self, name: &str) -> bool {
        self.start_dir.as_str() <= name && name <= self.end_dir.as_str()
    }

    #[inline]
    fn by_file_stem(&self, stem: &str) -> bool {
        self.start_file.as_str() <= stem && stem <= self.end_file.as_str()
    }
}

/// Converts epoch milliseconds to a date-time whose year has four digits,
/// the only ones the name keys can be built for.
fn to_datetime(epoch_ms: i64) -> Result<DateTime<Utc>, ScanError> {
    DateTime::from_timestamp_millis(epoch_ms)
        .filter(|datetime| (0..=9999).contains(&datetime.year()))
        .ok_or(ScanError::TimestampOutOfRange(epoch_ms))
}

fn format_key(datetime: DateTime<Utc>, format: &str, width: usize) -> String {
    let key = datetime.format(format).to_string();
    assert_eq!(
        key.len(),
        width,
        "layout key `{key}` must be fixed-width to be ordered as a string"
    );

    key
}

/// Returns the path of the file a logger starts writing at `epoch_ms`.
pub fn data_file_path(
    base_dir: &Path,
    device_id: &str,
    epoch_ms: i64,
    suffix: &str,
) -> Result<PathBuf, ScanError> {
    let datetime = to_datetime(epoch_ms)?;
    let dir_name = format_key(datetime, DIR_DATE_FORMAT, DIR_DATE_WIDTH);
    let file_name = format_key(datetime, FILE_DATE_FORMAT, FILE_DATE_WIDTH) + suffix;

    Ok(base_dir
        .join(DATA_DIR)
        .join(dir_name)
        .join(device_id)
        .join(file_name))
}

/// Finds the data files of a device that may hold records of `range`.
///
/// Files are selected by their directory and file names only, with a
/// resolution of [`FILE_INTERVAL_MS`]. The returned absolute paths are sorted,
/// which orders them chronologically. Days without a directory for the device
/// are skipped.
pub fn find_data_files(
    base_dir: &Path,
    device_id: &str,
    range: &TimeRange,
    suffix: &str,
) -> Result<Vec<PathBuf>, ScanError> {
    let keys = LayoutKeys::new(range)?;
    let data_dir = std::path::absolute(base_dir)
        .map_err(|source| ScanError::BaseDir {
            path: base_dir.to_path_buf(),
            source,
        })?
        .join(DATA_DIR);

    let mut files = Vec::new();

    for entry in fs::read_dir(&data_dir).map_read_dir_err(&data_dir)? {
        let entry = entry.map_read_dir_err(&data_dir)?;
        let path = entry.path();

        let Some(dir_name) = utf8_name(&path) else {
            continue;
        };

        if !keys.by_dir_name(dir_name) || !path.is_dir() {
            continue;
        }

        let device_dir = path.join(device_id);
        let device_entries = match fs::read_dir(&device_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %device_dir.display(), "no data for the device on this day");
                continue;
            }
            Err(source) => {
                return Err(ScanError::ReadDir {
                    path: device_dir,
                    source,
                });
            }
        };

        for entry in device_entries {
            let entry = entry.map_read_dir_err(&device_dir)?;
            let path = entry.path();

            let Some(stem) = utf8_name(&path).and_then(|name| name.strip_suffix(suffix)) else {
                continue;
            };

            if keys.by_file_stem(stem) && path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    debug!(
        device_id,
        files = files.len(),
        start_key = %keys.start_file,
        end_key = %keys.end_file,
        "located data files"
    );

    Ok(files)
}

fn utf8_name(path: &Path) -> Option<&str> {
    let utf8 = path.file_name()?.to_str();

    if utf8.is_none() {
        warn!(path = %path.display(), "skipping entry with a non UTF-8 name");
    }

    utf8
}
