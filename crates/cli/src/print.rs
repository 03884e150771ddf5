use std::io::Write;

use chrono::SecondsFormat;
use cuplogger_data::DataRecord;
use cuplogger_data::Payload;

use crate::cli::Format;
use crate::error::CliError;

/// Writes records to `writer`, one line per record.
pub(crate) struct RecordPrinter<W> {
    writer: W,
    format: Format,
}

impl<W: Write> RecordPrinter<W> {
    pub(crate) fn new(writer: W, format: Format) -> Self {
        Self { writer, format }
    }

    pub(crate) fn print(&mut self, record: &DataRecord) -> Result<(), CliError> {
        match self.format {
            Format::Json => {
                serde_json::to_writer(&mut self.writer, record)?;
                writeln!(self.writer)?;
            }
            Format::Text => self.print_text(record)?,
        }

        Ok(())
    }

    pub(crate) fn flush(&mut self) -> Result<(), CliError> {
        self.writer.flush()?;
        Ok(())
    }

    fn print_text(&mut self, record: &DataRecord) -> std::io::Result<()> {
        let timestamp = record
            .datetime()
            .map(|datetime| datetime.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| record.epoch_ms.to_string());

        match record.payload {
            Payload::RawText(ref text) => writeln!(self.writer, "{timestamp} {text}"),
            Payload::Event(ref event) => {
                write!(
                    self.writer,
                    "{timestamp} {}/{} {} dt={} \"{}\"",
                    event.program_id,
                    event.program_version,
                    event.device_config,
                    event.time_delta,
                    event.log_message
                )?;

                for (name, value) in &event.readings {
                    write!(self.writer, " {name}={value}")?;
                }

                writeln!(self.writer)
            }
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuplogger_data::parse_record;

    fn print(line: &str, format: Format) -> String {
        let record = parse_record(line).unwrap();
        let mut printer = RecordPrinter::new(Vec::new(), format);

        printer.print(&record).unwrap();

        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn print_text_raw_record() {
        let output = print("1705318467715,Loop #0", Format::Text);

        assert_eq!(output, "2024-01-15T11:34:27.715Z Loop #0\n");
    }

    #[test]
    fn print_text_event_record() {
        let output = print(
            "1704573210329,Temp+Humi,1.1,DHT11,1043,,temp:13.00,humi:41.00,47",
            Format::Text,
        );

        assert_eq!(
            output,
            "2024-01-06T20:33:30.329Z Temp+Humi/1.1 DHT11 dt=1043 \"\" humi=41 temp=13\n"
        );
    }

    #[test]
    fn print_json_raw_record() {
        let output = print("1705318467715,Loop #0", Format::Json);

        assert_eq!(output, "{\"epoch_ms\":1705318467715,\"raw_text\":\"Loop #0\"}\n");
    }

    #[test]
    fn print_json_event_record() {
        let output = print("1704573208216,Temp+Humi,1.1,DHT11,18,,tan:0.31,32", Format::Json);

        assert_eq!(
            output,
            concat!(
                "{\"epoch_ms\":1704573208216,\"event\":{",
                "\"program_id\":\"Temp+Humi\",\"program_version\":\"1.1\",",
                "\"device_config\":\"DHT11\",\"time_delta\":18,\"log_message\":\"\",",
                "\"readings\":{\"tan\":0.31}}}\n"
            )
        );
    }
}
