use std::io;

use cuplogger_data::parse_record;

use crate::cli::ParseArgs;
use crate::error::CliError;
use crate::print::RecordPrinter;

pub(crate) fn parse(args: ParseArgs) -> Result<(), CliError> {
    let record = parse_record(&args.line).ok_or(CliError::NoTimestamp)?;

    let mut printer = RecordPrinter::new(io::stdout().lock(), args.format);
    printer.print(&record)?;
    printer.flush()
}
