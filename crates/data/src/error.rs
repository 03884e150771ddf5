use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io;
use std::num::ParseFloatError;
use std::num::ParseIntError;
use std::path::PathBuf;

/// The error type for locating and scanning data files.
///
/// Only conditions the caller has to fix end up here. Undecodable lines,
/// malformed records and missing per-device directories are tolerated by
/// the scanner and never reported as errors.
#[derive(Debug)]
pub enum ScanError {
    /// A directory could not be listed.
    ReadDir { path: PathBuf, source: io::Error },

    /// A data file could not be opened.
    Open { path: PathBuf, source: io::Error },

    /// Reading from an open data file failed.
    Read { path: PathBuf, source: io::Error },

    /// The base directory could not be made absolute.
    BaseDir { path: PathBuf, source: io::Error },

    /// An epoch millisecond value that cannot be represented as a UTC date-time.
    TimestampOutOfRange(i64),
}

impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let scan_error = "scan error:";

        match self {
            ScanError::ReadDir { path, source } => {
                write!(f, "{scan_error} could not list the `{}` directory: {source}", path.display())
            }
            ScanError::Open { path, source } => {
                write!(f, "{scan_error} could not open the `{}` file: {source}", path.display())
            }
            ScanError::Read { path, source } => {
                write!(f, "{scan_error} could not read the `{}` file: {source}", path.display())
            }
            ScanError::BaseDir { path, source } => {
                write!(f, "{scan_error} could not resolve the `{}` base directory: {source}", path.display())
            }
            ScanError::TimestampOutOfRange(epoch_ms) => write!(
                f,
                "{scan_error} the {epoch_ms} epoch milliseconds timestamp is out of the supported range"
            ),
        }
    }
}

impl Error for ScanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScanError::ReadDir { source, .. } => Some(source),
            ScanError::Open { source, .. } => Some(source),
            ScanError::Read { source, .. } => Some(source),
            ScanError::BaseDir { source, .. } => Some(source),
            ScanError::TimestampOutOfRange(_) => None,
        }
    }
}

/// The reason a line with a valid timestamp is not a structured event.
///
/// The record parser falls back to a raw text record on any of these.
#[derive(Debug, Clone, PartialEq)]
pub enum EventParseError {
    /// The line has no trailing length field.
    MissingLengthField,

    /// The trailing length field is not an unsigned integer.
    InvalidLength(ParseIntError),

    /// The declared payload length differs from the measured one.
    LengthMismatch { declared: usize, actual: usize },

    /// Fewer fields than the event header needs.
    MissingFields { found: usize },

    /// The time delta field is not empty and not an integer.
    InvalidTimeDelta(ParseIntError),

    /// A reading field without the `:` separator.
    MissingReadingSeparator { field: String },

    /// A reading value that is not a floating point number.
    InvalidReadingValue {
        name: String,
        source: ParseFloatError,
    },
}

impl Display for EventParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let parse_error = "event parse error:";

        match self {
            EventParseError::MissingLengthField => {
                write!(f, "{parse_error} the trailing length field is missing")
            }
            EventParseError::InvalidLength(error) => {
                write!(f, "{parse_error} could not parse the length field: {error}")
            }
            EventParseError::LengthMismatch { declared, actual } => write!(
                f,
                "{parse_error} declared length {declared} does not match the actual length {actual}"
            ),
            EventParseError::MissingFields { found } => {
                write!(f, "{parse_error} expected at least 5 header fields, found {found}")
            }
            EventParseError::InvalidTimeDelta(error) => {
                write!(f, "{parse_error} could not parse the time delta: {error}")
            }
            EventParseError::MissingReadingSeparator { field } => {
                write!(f, "{parse_error} the \"{field}\" reading has no `:` separator")
            }
            EventParseError::InvalidReadingValue { name, source } => {
                write!(f, "{parse_error} the \"{name}\" reading value is not a number: {source}")
            }
        }
    }
}

impl Error for EventParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EventParseError::InvalidLength(error) => Some(error),
            EventParseError::InvalidTimeDelta(error) => Some(error),
            EventParseError::InvalidReadingValue { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub(crate) trait IoResultExt<T> {
    fn map_read_dir_err(self, path: impl Into<PathBuf>) -> Result<T, ScanError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn map_read_dir_err(self, path: impl Into<PathBuf>) -> Result<T, ScanError> {
        self.map_err(|source| ScanError::ReadDir {
            path: path.into(),
            source,
        })
    }
}
