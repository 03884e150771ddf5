use chrono::DateTime;
use chrono::Utc;

use crate::layout::FILE_INTERVAL_MS;

/// A half-open `[start, end)` interval of epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub(crate) start_ms: i64,
    pub(crate) end_ms: i64,
}

impl TimeRange {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start.timestamp_millis(), end.timestamp_millis())
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    #[inline]
    pub fn contains(&self, epoch_ms: i64) -> bool {
        epoch_ms >= self.start_ms && epoch_ms < self.end_ms
    }

    /// Widens the range to whole file intervals.
    ///
    /// The start is rounded down to its interval boundary and the end is moved
    /// to the last millisecond of its interval, so every file that may hold a
    /// record of the range starts within the returned bounds. Both bounds are
    /// inclusive.
    pub fn file_window(&self) -> (i64, i64) {
        let start = floor_interval(self.start_ms);
        let end = floor_interval(self.end_ms).saturating_add(FILE_INTERVAL_MS - 1);

        (start, end)
    }
}

fn floor_interval(epoch_ms: i64) -> i64 {
    epoch_ms
        .div_euclid(FILE_INTERVAL_MS)
        .saturating_mul(FILE_INTERVAL_MS)
}
