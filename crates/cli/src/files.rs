use std::io;
use std::io::Write;

use tracing::info;

use crate::cli::RangeArgs;
use crate::error::CliError;

pub(crate) fn files(args: RangeArgs) -> Result<(), CliError> {
    let range = args.time_range()?;
    let files = args.store().find_data_files(&args.device, range)?;

    info!(
        "found {} data files of the `{}` device in `{}`",
        files.len(),
        args.device,
        args.base_dir.display()
    );

    let mut stdout = io::stdout().lock();
    for path in files {
        writeln!(stdout, "{}", path.display())?;
    }

    Ok(())
}
