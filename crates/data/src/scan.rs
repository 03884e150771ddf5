use std::ops::ControlFlow;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;

use crate::error::ScanError;
use crate::filter::TimeRange;
use crate::layout;
use crate::read::Records;
use crate::read::ScanSummary;
use crate::record::DataRecord;

/// Replays the records of a device within `range` to `consumer`, in
/// chronological order.
///
/// The consumer runs inline, between two reads. It stops the scan by returning
/// [`ControlFlow::Break`]; an error it returns aborts the scan and is returned
/// as is. I/O errors abort the scan as well.
pub fn scan<F, E>(
    base_dir: &Path,
    device_id: &str,
    range: TimeRange,
    suffix: &str,
    consumer: F,
) -> Result<ScanSummary, E>
where
    F: FnMut(DataRecord) -> Result<ControlFlow<()>, E>,
    E: From<ScanError>,
{
    let files = layout::find_data_files(base_dir, device_id, &range, suffix)?;
    scan_files(files, range, consumer)
}

/// Replays the records within `range` of the given files, in file order.
pub fn scan_files<F, E>(files: Vec<PathBuf>, range: TimeRange, mut consumer: F) -> Result<ScanSummary, E>
where
    F: FnMut(DataRecord) -> Result<ControlFlow<()>, E>,
    E: From<ScanError>,
{
    let started = Instant::now();
    let mut records = Records::new(files, range);

    for record in records.by_ref() {
        if consumer(record?)?.is_break() {
            debug!("scan stopped by the consumer");
            break;
        }
    }

    let mut summary = *records.summary();
    summary.elapsed = started.elapsed();

    debug!(
        files = summary.files,
        lines = summary.lines,
        undecodable_lines = summary.undecodable_lines,
        unparseable_lines = summary.unparseable_lines,
        records = summary.records,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        records_per_sec = summary.records_per_sec(),
        "scan finished"
    );

    Ok(summary)
}
