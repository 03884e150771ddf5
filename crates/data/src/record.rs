use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use tracing::trace;

use crate::error::EventParseError;

const FIELD_DELIMITER: char = ',';
const READING_DELIMITER: char = ':';

/// Header fields between the timestamp and the readings.
const HEADER_FIELDS_COUNT: usize = 5;

/// Timestamp, header fields and the trailing length field.
const MIN_EVENT_FIELDS_COUNT: usize = HEADER_FIELDS_COUNT + 2;

/// A structured sensor event written by the logger firmware.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub program_id: String,
    pub program_version: String,
    pub device_config: String,
    /// Logger-local elapsed time, `0` when the logger did not report it.
    pub time_delta: i64,
    pub log_message: String,
    pub readings: BTreeMap<String, f64>,
}

/// Parses the part of a line that follows the timestamp:
///
/// ```text
/// <programId>,<programVersion>,<deviceConfig>,<timeDelta>,<logMessage>[,<name>:<value>...],<length>
/// ```
///
/// `<length>` is the number of bytes before its own delimiter and it has to
/// match for the text to be accepted as an event.
impl FromStr for Event {
    type Err = EventParseError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let (body, length) = payload
            .rsplit_once(FIELD_DELIMITER)
            .ok_or(EventParseError::MissingLengthField)?;

        let declared: usize = length.parse().map_err(EventParseError::InvalidLength)?;
        if declared != body.len() {
            return Err(EventParseError::LengthMismatch {
                declared,
                actual: body.len(),
            });
        }

        let mut fields = body.split(FIELD_DELIMITER);
        let mut header = [""; HEADER_FIELDS_COUNT];
        for (found, field) in header.iter_mut().enumerate() {
            *field = fields
                .next()
                .ok_or(EventParseError::MissingFields { found })?;
        }

        let [program_id, program_version, device_config, time_delta, log_message] = header;

        let time_delta = if time_delta.is_empty() {
            0
        } else {
            time_delta
                .parse()
                .map_err(EventParseError::InvalidTimeDelta)?
        };

        let readings = fields
            .map(parse_reading)
            .collect::<Result<BTreeMap<String, f64>, EventParseError>>()?;

        Ok(Event {
            program_id: program_id.to_owned(),
            program_version: program_version.to_owned(),
            device_config: device_config.to_owned(),
            time_delta,
            log_message: log_message.to_owned(),
            readings,
        })
    }
}

fn parse_reading(field: &str) -> Result<(String, f64), EventParseError> {
    let (name, value) = field.split_once(READING_DELIMITER).ok_or_else(|| {
        EventParseError::MissingReadingSeparator {
            field: field.to_owned(),
        }
    })?;

    let value = value
        .parse::<f64>()
        .map_err(|source| EventParseError::InvalidReadingValue {
            name: name.to_owned(),
            source,
        })?;

    Ok((name.to_owned(), value))
}

/// The content of a line after its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Free text, or a line that failed the structured event validation.
    RawText(String),
    Event(Event),
}

/// A single timestamped line of a data file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataRecord {
    pub epoch_ms: i64,
    #[serde(flatten)]
    pub payload: Payload,
}

impl DataRecord {
    pub fn raw_text(&self) -> Option<&str> {
        match self.payload {
            Payload::RawText(ref text) => Some(text.as_str()),
            Payload::Event(_) => None,
        }
    }

    pub fn event(&self) -> Option<&Event> {
        match self.payload {
            Payload::Event(ref event) => Some(event),
            Payload::RawText(_) => None,
        }
    }

    /// The record timestamp in UTC, `None` when it is out of chrono's range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.epoch_ms)
    }
}

/// Parses one line of a data file.
///
/// Returns `None` only when the text before the first comma is not an
/// integer timestamp. Lines that are not valid structured events are kept
/// as [`Payload::RawText`] holding everything after the first comma.
pub fn parse_record(line: &str) -> Option<DataRecord> {
    let line = strip_line_terminator(line);
    let (timestamp, raw_text) = line.split_once(FIELD_DELIMITER).unwrap_or((line, ""));
    let epoch_ms: i64 = timestamp.parse().ok()?;

    if line.split(FIELD_DELIMITER).count() < MIN_EVENT_FIELDS_COUNT {
        return Some(DataRecord {
            epoch_ms,
            payload: Payload::RawText(raw_text.to_owned()),
        });
    }

    let payload = match raw_text.parse::<Event>() {
        Ok(event) => Payload::Event(event),
        Err(error) => {
            trace!(epoch_ms, %error, "keeping line as raw text");
            Payload::RawText(raw_text.to_owned())
        }
    };

    Some(DataRecord { epoch_ms, payload })
}

pub(crate) fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1704573206646,Temp+Humi,1.1,DHT11,39,Inside loop #43,39" ; "wrong length")]
    #[test_case("1704573206646,Temp+Humi,1.1,DHT11_39,Inside loop #43,38" ; "missing comma")]
    #[test_case("1704573208216,Temp+Humi,1.1,DHT11,18,,tan,0.31,32" ; "reading without colon")]
    #[test_case("1,p,v,c,x,m,9" ; "non numeric time delta")]
    #[test_case("1,p,v,c,,,a:1:2,13" ; "reading with two colons")]
    #[test_case("1,p,v,c,,,a:x,11" ; "non numeric reading")]
    #[test_case("1,p,v,c,,,7x" ; "non numeric length")]
    #[test_case("1,p,v,c,,,-7" ; "negative length")]
    #[test_case("1,p,v,c,,héllo,12" ; "length counted in chars")]
    fn parse_record_falls_back_to_raw_text(line: &str) {
        let record = parse_record(line).unwrap();

        let (_, expected) = line.split_once(',').unwrap();
        assert_eq!(record.raw_text(), Some(expected));
        assert_eq!(record.event(), None);
    }

    #[test]
    fn parse_record_reads_log_line_without_readings() {
        let record = parse_record("1704573209370,Temp+Humi,1.1,DHT11,39,Inside loop #2,37").unwrap();

        let expected = Event {
            program_id: "Temp+Humi".to_owned(),
            program_version: "1.1".to_owned(),
            device_config: "DHT11".to_owned(),
            time_delta: 39,
            log_message: "Inside loop #2".to_owned(),
            readings: BTreeMap::new(),
        };

        assert_eq!(record.epoch_ms, 1704573209370);
        assert_eq!(record.event(), Some(&expected));
        assert_eq!(record.raw_text(), None);
    }

    #[test]
    fn parse_record_reads_single_reading() {
        let record = parse_record("1704573208216,Temp+Humi,1.1,DHT11,18,,tan:0.31,32").unwrap();
        let event = record.event().unwrap();

        assert_eq!(event.time_delta, 18);
        assert_eq!(event.log_message, "");
        assert_eq!(event.readings, BTreeMap::from([("tan".to_owned(), 0.31)]));
    }

    #[test]
    fn parse_record_reads_multiple_readings() {
        let record =
            parse_record("1704573210329,Temp+Humi,1.1,DHT11,1043,,temp:13.00,humi:41.00,47").unwrap();
        let event = record.event().unwrap();

        assert_eq!(event.time_delta, 1043);
        assert_eq!(
            event.readings,
            BTreeMap::from([("temp".to_owned(), 13.0), ("humi".to_owned(), 41.0)])
        );
    }

    #[test]
    fn parse_record_accepts_negative_time_delta() {
        let record = parse_record("1704573209370,Temp+Humi,1.1,DHT11,-39,Inside loop #2,38").unwrap();
        let event = record.event().unwrap();

        assert_eq!(event.time_delta, -39);
        assert_eq!(event.log_message, "Inside loop #2");
        assert_eq!(record.raw_text(), None);
    }

    #[test]
    fn parse_record_defaults_empty_time_delta_to_zero() {
        let record = parse_record("1,p,v,c,,,7").unwrap();
        let event = record.event().unwrap();

        assert_eq!(event.time_delta, 0);
        assert_eq!(event.log_message, "");
        assert!(event.readings.is_empty());
    }

    #[test]
    fn parse_record_measures_length_in_bytes() {
        let record = parse_record("1,p,v,c,,héllo,13").unwrap();

        assert_eq!(record.event().unwrap().log_message, "héllo");
    }

    #[test]
    fn parse_record_keeps_last_duplicate_reading() {
        let record = parse_record("1,p,v,c,,,a:1,a:2,15").unwrap();

        assert_eq!(
            record.event().unwrap().readings,
            BTreeMap::from([("a".to_owned(), 2.0)])
        );
    }

    #[test]
    fn parse_record_strips_line_terminators() {
        let record = parse_record("1704573208216,Temp+Humi,1.1,DHT11,18,,tan:0.31,32\r\n").unwrap();
        assert!(record.event().is_some());

        let record = parse_record("1705318467715,Loop #0\n").unwrap();
        assert_eq!(record.raw_text(), Some("Loop #0"));
    }

    #[test]
    fn parse_record_accepts_timestamp_only_line() {
        let record = parse_record("12345").unwrap();

        assert_eq!(record.epoch_ms, 12345);
        assert_eq!(record.raw_text(), Some(""));
    }

    #[test_case("" ; "empty line")]
    #[test_case("Loop #0" ; "free text")]
    #[test_case(",Temp+Humi,1.1,DHT11,39,Inside loop #2,37" ; "empty timestamp")]
    #[test_case("17045732O9370,Temp+Humi,1.1,DHT11,39,Inside loop #2,37" ; "letter in timestamp")]
    #[test_case("99999999999999999999,a" ; "timestamp overflow")]
    fn parse_record_rejects_line_without_timestamp(line: &str) {
        assert_eq!(parse_record(line), None);
    }

    #[test]
    fn datetime_converts_epoch_milliseconds() {
        let record = parse_record("1705318467715,Loop #0").unwrap();

        assert_eq!(
            record.datetime().unwrap().to_rfc3339(),
            "2024-01-15T11:34:27.715+00:00"
        );
    }

    #[test]
    fn event_from_str_reports_length_mismatch() {
        let error = "Temp+Humi,1.1,DHT11,39,Inside loop #43,39"
            .parse::<Event>()
            .unwrap_err();

        assert_eq!(
            error,
            EventParseError::LengthMismatch {
                declared: 39,
                actual: 38
            }
        );
    }

    #[test]
    fn event_from_str_reports_missing_header_fields() {
        let error = "a,b,3".parse::<Event>().unwrap_err();

        assert_eq!(error, EventParseError::MissingFields { found: 2 });
    }
}
