use std::io;
use std::io::BufWriter;
use std::ops::ControlFlow;

use tracing::info;

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::print::RecordPrinter;

pub(crate) fn scan(args: ScanArgs) -> Result<(), CliError> {
    let range = args.range.time_range()?;
    let store = args.range.store();

    info!(
        "cuplogger scans the `{}` device data from `{}`, between {} and {}",
        args.range.device,
        store.base_dir().display(),
        range.start_ms(),
        range.end_ms()
    );

    let mut printer = RecordPrinter::new(BufWriter::new(io::stdout().lock()), args.format);
    let mut printed: u64 = 0;

    let summary = store.scan(&args.range.device, range, |record| -> Result<_, CliError> {
        printer.print(&record)?;
        printed += 1;

        if args.limit.is_some_and(|limit| printed >= limit) {
            return Ok(ControlFlow::Break(()));
        }

        Ok(ControlFlow::Continue(()))
    })?;

    printer.flush()?;

    info!(
        "printed {printed} records from {} files, {} lines read in {} ms",
        summary.files,
        summary.lines,
        summary.elapsed.as_millis()
    );

    Ok(())
}
