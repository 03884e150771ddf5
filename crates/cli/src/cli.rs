use std::path::PathBuf;

use chrono::DateTime;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use cuplogger_data::DataStore;
use cuplogger_data::TimeRange;
use cuplogger_data::layout::DEFAULT_FILE_SUFFIX;
use tracing::Level;

use crate::error::CliError;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Increase the logging verbosity: `-v` info, `-vv` debug, `-vvv` trace.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub(crate) verbose: u8,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

impl Cli {
    pub(crate) fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the data files that may hold records of the time range.
    Files(RangeArgs),
    /// Parse a single line of a data file and print the record.
    Parse(ParseArgs),
    /// Print the records of the time range in chronological order.
    Scan(ScanArgs),
}

#[derive(Args)]
pub(crate) struct RangeArgs {
    /// Specify the base directory of the logger, the one holding the `data` directory.
    /// The path must exist and it must point to a directory.
    #[arg(short, long, value_parser(parse_path))]
    pub(crate) base_dir: PathBuf,

    /// Specify the serial number of the device.
    #[arg(short, long)]
    pub(crate) device: String,

    /// Specify the start of the time range, inclusive, either as epoch
    /// milliseconds or as an RFC 3339 date-time.
    #[arg(short, long, value_parser(parse_timestamp), allow_negative_numbers = true)]
    pub(crate) start: i64,

    /// Specify the end of the time range, exclusive, either as epoch
    /// milliseconds or as an RFC 3339 date-time.
    #[arg(short, long, value_parser(parse_timestamp), allow_negative_numbers = true)]
    pub(crate) end: i64,

    /// Specify the suffix of the data files.
    #[arg(long, default_value = DEFAULT_FILE_SUFFIX)]
    pub(crate) suffix: String,
}

impl RangeArgs {
    pub(crate) fn store(&self) -> DataStore {
        DataStore::new(&self.base_dir).with_suffix(&self.suffix)
    }

    pub(crate) fn time_range(&self) -> Result<TimeRange, CliError> {
        if self.start > self.end {
            return Err(CliError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }

        Ok(TimeRange::new(self.start, self.end))
    }
}

#[derive(Args)]
pub(crate) struct ParseArgs {
    /// The line to parse, including its leading timestamp.
    pub(crate) line: String,

    /// Specify how the record is printed.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub(crate) format: Format,
}

#[derive(Args)]
pub(crate) struct ScanArgs {
    #[command(flatten)]
    pub(crate) range: RangeArgs,

    /// Specify how the records are printed.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub(crate) format: Format,

    /// Stop after printing this many records.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) limit: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// One human readable line per record.
    Text,
    /// One JSON object per line.
    Json,
}

fn parse_path(path: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path);

    if !path.exists() {
        return Err(format!("The `{}` path does not exist.", path.display()));
    }

    if !path.is_dir() {
        return Err(format!(
            "The `{}` path must point to a directory.",
            path.display()
        ));
    }

    Ok(path)
}

fn parse_timestamp(value: &str) -> Result<i64, String> {
    if let Ok(epoch_ms) = value.parse::<i64>() {
        return Ok(epoch_ms);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|datetime| datetime.timestamp_millis())
        .map_err(|_| {
            format!("`{value}` is neither epoch milliseconds nor an RFC 3339 date-time.")
        })
}
