//! Reads the data files written by a CupLogger data logger.
//!
//! A logger appends one line per message it receives from a device. A line
//! starts with the epoch milliseconds it was received at and is either free
//! text or a structured event with sensor readings. Files are grouped per day
//! and per device and each one covers ten minutes, see [`layout`].
//!
//! ```no_run
//! use std::ops::ControlFlow;
//!
//! use cuplogger_data::DataStore;
//! use cuplogger_data::TimeRange;
//! use cuplogger_data::error::ScanError;
//!
//! let store = DataStore::new("/tmp/cuplogger");
//! let range = TimeRange::new(1705318466234, 1705418466234);
//!
//! store.scan("242353135363516111A2", range, |record| {
//!     println!("{record:?}");
//!     Ok::<_, ScanError>(ControlFlow::Continue(()))
//! })?;
//! # Ok::<(), ScanError>(())
//! ```

mod filter;
mod read;
mod record;
mod scan;

pub mod error;
pub mod layout;

use std::ops::ControlFlow;
use std::path::Path;
use std::path::PathBuf;

pub use crate::filter::TimeRange;
pub use crate::layout::find_data_files;
pub use crate::read::Records;
pub use crate::read::ScanSummary;
pub use crate::record::DataRecord;
pub use crate::record::Event;
pub use crate::record::Payload;
pub use crate::record::parse_record;
pub use crate::scan::scan;
pub use crate::scan::scan_files;

use crate::error::ScanError;
use crate::layout::DEFAULT_FILE_SUFFIX;

/// The data directory of a logger.
#[derive(Debug, Clone)]
pub struct DataStore {
    base_dir: PathBuf,
    suffix: String,
}

impl DataStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            suffix: DEFAULT_FILE_SUFFIX.to_owned(),
        }
    }

    /// Reads files ending in `suffix` instead of `.txt`.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn find_data_files(&self, device_id: &str, range: TimeRange) -> Result<Vec<PathBuf>, ScanError> {
        layout::find_data_files(&self.base_dir, device_id, &range, &self.suffix)
    }

    /// Returns a lazy iterator over the records of a device within `range`.
    pub fn records(&self, device_id: &str, range: TimeRange) -> Result<Records, ScanError> {
        let files = self.find_data_files(device_id, range)?;
        Ok(Records::new(files, range))
    }

    /// See [`scan()`].
    pub fn scan<F, E>(&self, device_id: &str, range: TimeRange, consumer: F) -> Result<ScanSummary, E>
    where
        F: FnMut(DataRecord) -> Result<ControlFlow<()>, E>,
        E: From<ScanError>,
    {
        scan::scan(&self.base_dir, device_id, range, &self.suffix, consumer)
    }

    /// Collects the records of a device within `range`.
    pub fn read_records(&self, device_id: &str, range: TimeRange) -> Result<Vec<DataRecord>, ScanError> {
        let mut records = Vec::with_capacity(4 * 1024);

        self.scan(device_id, range, |record| {
            records.push(record);
            Ok::<_, ScanError>(ControlFlow::Continue(()))
        })?;

        Ok(records)
    }
}
