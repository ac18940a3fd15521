//! Rendering of pipeline outcomes: text records, JSON lines, and the stats summary.

use std::io::{self, Write};

use comfy_table::{Cell, Table};
use serde::Serialize;

use ais_core::config::OutputFormat;
use ais_core::{message_type_name, AisError, AisMessage, Outcome, PipelineStats};

/// A failed input as it appears in JSON output.
#[derive(Serialize)]
struct ErrorLine<'a> {
    error: String,
    input: &'a [String],
}

/// Where rendered outcomes go and what to include.
pub struct Printer<W: Write> {
    out: W,
    format: OutputFormat,
    include_errors: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, format: OutputFormat, include_errors: bool) -> Self {
        Printer {
            out,
            format,
            include_errors,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Message(msg) => self.message(msg),
            Outcome::Error { input, error } if self.include_errors => self.error(input, error),
            Outcome::Error { .. } => Ok(()),
        }
    }

    fn message(&mut self, msg: &AisMessage) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, msg)?;
                writeln!(self.out)
            }
            OutputFormat::Text => write_message_text(&mut self.out, msg),
        }
    }

    fn error(&mut self, input: &[String], error: &AisError) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let line = ErrorLine {
                    error: error.to_string(),
                    input,
                };
                serde_json::to_writer(&mut self.out, &line)?;
                writeln!(self.out)
            }
            OutputFormat::Text => {
                writeln!(self.out, "error: {error}")?;
                for raw in input {
                    writeln!(self.out, "  > {raw}")?;
                }
                writeln!(self.out)
            }
        }
    }
}

/// One display record per message, field names padded to a column.
pub fn write_message_text<W: Write>(out: &mut W, msg: &AisMessage) -> io::Result<()> {
    let decoded = &msg.decoded;
    match decoded.mmsi() {
        Some(mmsi) => writeln!(
            out,
            "[{}] {} (MMSI {mmsi}, channel {})",
            decoded.msg_type, decoded.type_name, msg.channel
        )?,
        None => writeln!(
            out,
            "[{}] {} (channel {})",
            decoded.msg_type, decoded.type_name, msg.channel
        )?,
    }

    let width = decoded.display.names().map(str::len).max().unwrap_or(0);
    for (name, value) in decoded.display.iter() {
        writeln!(out, "  {name:<width$}  {value}")?;
    }
    writeln!(out)
}

/// Run counters followed by a per-type table.
pub fn write_summary<W: Write>(out: &mut W, stats: &PipelineStats) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Lines: {} read, {} sentences, {} messages decoded, {} errors",
        stats.lines,
        stats.sentences,
        stats.messages,
        stats.errors()
    )?;
    writeln!(out)?;
    writeln!(out, "  Malformed sentences:  {}", stats.malformed)?;
    writeln!(out, "  Reassembly errors:    {}", stats.reassembly_errors)?;
    writeln!(out, "  Unsupported types:    {}", stats.unsupported)?;
    writeln!(out, "  Decode failures:      {}", stats.decode_errors)?;
    writeln!(out)?;

    if stats.by_type.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Type", "Name", "Messages"]);

    let mut sorted: Vec<_> = stats.by_type.iter().collect();
    sorted.sort_by_key(|(code, count)| (std::cmp::Reverse(**count), **code));

    for (code, count) in sorted {
        table.add_row(vec![
            Cell::new(code),
            Cell::new(message_type_name(*code)),
            Cell::new(count),
        ]);
    }

    writeln!(out, "{table}")?;
    writeln!(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ais_core::Pipeline;

    const TYPE1: &str = "!AIVDM,1,1,,A,13QWhR012COJ`0TDSdkCS2ph0@=j,0*6C";

    fn render(format: OutputFormat, include_errors: bool, lines: &[&str]) -> String {
        let mut pipeline = Pipeline::default();
        let mut printer = Printer::new(Vec::new(), format, include_errors);
        for line in lines {
            for outcome in pipeline.feed(line, 0.0) {
                printer.outcome(&outcome).unwrap();
            }
        }
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn test_text_record() {
        let text = render(OutputFormat::Text, false, &[TYPE1]);
        assert!(text.starts_with("[1] Position Report Class A (MMSI 236581000, channel A)"));
        assert!(text.contains("True Heading"));
        assert!(text.contains("92°"));
    }

    #[test]
    fn test_json_line_per_message() {
        let text = render(OutputFormat::Json, false, &[TYPE1, TYPE1]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let json: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(json["type_code"], 1);
        assert_eq!(json["raw_fields"]["MMSI"], 236581000);
    }

    #[test]
    fn test_errors_hidden_by_default() {
        let text = render(OutputFormat::Text, false, &["!AIVDM,garbage"]);
        assert!(text.is_empty());
    }

    #[test]
    fn test_errors_rendered_with_input() {
        let text = render(OutputFormat::Text, true, &["!AIVDM,garbage"]);
        assert!(text.starts_with("error: malformed sentence"));
        assert!(text.contains("  > !AIVDM,garbage"));

        let json = render(OutputFormat::Json, true, &["!AIVDM,garbage"]);
        let value: serde_json::Value = serde_json::from_str(json.trim()).unwrap();
        assert_eq!(value["input"][0], "!AIVDM,garbage");
        assert!(value["error"].as_str().unwrap().contains("malformed"));
    }

    #[test]
    fn test_summary_table() {
        let mut pipeline = Pipeline::default();
        pipeline.feed(TYPE1, 0.0);
        pipeline.feed(TYPE1, 0.1);
        pipeline.feed("not a sentence", 0.2);

        let mut out = Vec::new();
        write_summary(&mut out, pipeline.stats()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("3 read, 2 sentences, 2 messages decoded, 1 errors"));
        assert!(text.contains("Position Report Class A"));
    }

    #[test]
    fn test_summary_without_messages_has_no_table() {
        let mut out = Vec::new();
        write_summary(&mut out, &PipelineStats::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("0 messages decoded"));
        assert!(!text.contains("Name"));
    }
}
