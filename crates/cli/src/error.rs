use std::error::Error;
use std::fmt::Display;
use std::io;

use cuplogger_data::error::ScanError;

#[derive(Debug)]
pub(crate) enum CliError {
    Scan(ScanError),
    Output(io::Error),
    Json(serde_json::Error),
    InvalidRange { start: i64, end: i64 },
    NoTimestamp,
}

impl From<ScanError> for CliError {
    fn from(error: ScanError) -> Self {
        CliError::Scan(error)
    }
}

impl From<io::Error> for CliError {
    fn from(error: io::Error) -> Self {
        CliError::Output(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        CliError::Json(error)
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cli_error = "CLI error:";

        match self {
            CliError::Scan(error) => write!(f, "{cli_error} {error}"),
            CliError::Output(error) => write!(f, "{cli_error} could not write the output: {error}"),
            CliError::Json(error) => write!(f, "{cli_error} could not serialize the record: {error}"),
            CliError::InvalidRange { start, end } => write!(
                f,
                "{cli_error} the start timestamp {start} is after the end timestamp {end}"
            ),
            CliError::NoTimestamp => write!(f, "{cli_error} the line does not start with a timestamp"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::Scan(error) => Some(error),
            CliError::Output(error) => Some(error),
            CliError::Json(error) => Some(error),
            CliError::InvalidRange { .. } | CliError::NoTimestamp => None,
        }
    }
}
