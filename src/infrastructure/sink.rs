//! Export sink: the durable destination for projected records.
//!
//! One file per request, named deterministically from the window bounds,
//! scope, and format. The file is created (truncating any previous run of
//! the same request) once, then only appended to.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};

use crate::domain::{ExportError, ExportRecord, ExtractionRequest, OutputFormat, Result};

/// Placeholder body written for messages with a non-text payload.
pub const MEDIA_PLACEHOLDER: &str = "[non-text payload]";
/// Placeholder body written for messages with no text at all.
pub const EMPTY_BODY_PLACEHOLDER: &str = "[no content]";

/// Computes the output file name for a request.
///
/// Pure function of (window bounds, optional normalized chat id, format), so
/// repeating an identical request overwrites the previous file instead of
/// accumulating new ones. Stamps are UTC to keep the name host-independent.
#[must_use]
pub fn output_file_name(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    chat_id: Option<&str>,
    format: OutputFormat,
) -> String {
    let stamp = |t: DateTime<Utc>| t.format("%Y%m%dT%H%M%SZ");

    let chat_part = chat_id.map_or_else(String::new, |id| {
        // Drop the domain suffix; `551199999999@c.us` names the file
        // `...-551199999999.jsonl`.
        let local = id.split('@').next().unwrap_or(id);
        format!("-{local}")
    });

    format!(
        "messages-{}-{}{}.{}",
        stamp(start),
        stamp(end),
        chat_part,
        format.extension()
    )
}

/// Append-only writer for one extraction request.
pub struct ExportSink {
    path: PathBuf,
    writer: BufWriter<File>,
    format: OutputFormat,
}

impl ExportSink {
    /// Creates (truncating) the output file for a request.
    ///
    /// `chat_id` is the normalized single-chat id, when the scope has one.
    ///
    /// # Errors
    /// Returns `SinkWrite` if the file cannot be created.
    pub fn create(dir: &Path, request: &ExtractionRequest, chat_id: Option<&str>) -> Result<Self> {
        let name = output_file_name(
            request.window_start,
            request.window_end,
            chat_id,
            request.format,
        );
        let path = dir.join(name);

        let file = File::create(&path)
            .map_err(|e| ExportError::sink(format!("Failed to create {}", path.display()), e))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            format: request.format,
        })
    }

    /// Where this sink writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the report header. No-op for line-record output.
    ///
    /// `chat_id` is the *normalized* single-chat id, when the scope has one,
    /// so the header names the same id as the section separators below it.
    ///
    /// # Errors
    /// Returns `SinkWrite` on IO failure.
    pub fn write_header(&mut self, request: &ExtractionRequest, chat_id: Option<&str>) -> Result<()> {
        if self.format != OutputFormat::Text {
            return Ok(());
        }

        let scope = chat_id.map_or_else(
            || "all chats".to_string(),
            |id| format!("chat {id}"),
        );

        let header = format!(
            "--- WHATSAPP MESSAGE EXPORT ---\n\
             Exported: {}\n\
             Window: {} to {} (local time)\n\
             Scope: {}\n\
             ------------------------------------------\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            request.window_start.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            request.window_end.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            scope,
        );

        self.append(header.as_bytes())
    }

    /// Writes one chat's records: a section separator plus one line per
    /// record in text mode, or one JSON object per record in JSONL mode.
    /// Callers skip chats with no in-window records.
    ///
    /// # Errors
    /// Returns `SinkWrite` on IO or serialization failure.
    pub fn write_chat(
        &mut self,
        title: &str,
        chat_id: &str,
        records: &[ExportRecord],
    ) -> Result<()> {
        match self.format {
            OutputFormat::Jsonl => {
                for record in records {
                    let line = serde_json::to_string(record).map_err(|e| {
                        ExportError::SinkWrite {
                            message: format!("Failed to serialize record: {e}"),
                            source: None,
                        }
                    })?;
                    self.append(line.as_bytes())?;
                    self.append(b"\n")?;
                }
            }
            OutputFormat::Text => {
                let separator = format!(
                    "\n=== {} ({}) - {} messages ===\n\n",
                    title,
                    chat_id,
                    records.len()
                );
                self.append(separator.as_bytes())?;

                for record in records {
                    let time = DateTime::from_timestamp(record.timestamp, 0)
                        .unwrap_or_default()
                        .with_timezone(&Local)
                        .format("%H:%M:%S");
                    let line =
                        format!("[{}] [{}] - {}\n", time, record.sender_label, record.body);
                    self.append(line.as_bytes())?;
                }
            }
        }

        Ok(())
    }

    /// Flushes and closes the sink, returning the output path.
    ///
    /// # Errors
    /// Returns `SinkWrite` if the final flush fails.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .map_err(|e| ExportError::sink("Failed to flush export file", e))?;
        Ok(self.path)
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| ExportError::sink(format!("Failed to append to {}", self.path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scope;
    use chrono::TimeZone;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 10, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 10, 2, 23, 59, 59).unwrap(),
        )
    }

    fn request(format: OutputFormat, scope: Scope) -> ExtractionRequest {
        let (start, end) = window();
        ExtractionRequest {
            scope,
            window_start: start,
            window_end: end,
            format,
        }
    }

    fn record(ts: i64, body: &str) -> ExportRecord {
        ExportRecord {
            conversation_id: "123@c.us".into(),
            conversation_title: "Alice".into(),
            sender_label: "551188888888@c.us".into(),
            author_id: None,
            timestamp: ts,
            body: body.into(),
        }
    }

    #[test]
    fn test_file_name_is_deterministic() {
        let (start, end) = window();
        let a = output_file_name(start, end, Some("551199999999@c.us"), OutputFormat::Jsonl);
        let b = output_file_name(start, end, Some("551199999999@c.us"), OutputFormat::Jsonl);
        assert_eq!(a, b);
        assert_eq!(
            a,
            "messages-20251002T000000Z-20251002T235959Z-551199999999.jsonl"
        );
    }

    #[test]
    fn test_file_name_without_chat_id() {
        let (start, end) = window();
        let name = output_file_name(start, end, None, OutputFormat::Text);
        assert_eq!(name, "messages-20251002T000000Z-20251002T235959Z.txt");
    }

    #[test]
    fn test_jsonl_one_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(OutputFormat::Jsonl, Scope::AllChats);

        let mut sink = ExportSink::create(dir.path(), &req, None).unwrap();
        sink.write_header(&req, None).unwrap();
        sink.write_chat("Alice", "123@c.us", &[record(1_759_363_200, "hi"), record(1_759_363_300, "there")])
            .unwrap();
        let path = sink.finish().unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["conversationId"], "123@c.us");
        }
    }

    #[test]
    fn test_text_report_has_header_and_section() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(OutputFormat::Text, Scope::SingleChat("123@c.us".into()));

        let mut sink = ExportSink::create(dir.path(), &req, Some("123@c.us")).unwrap();
        sink.write_header(&req, Some("123@c.us")).unwrap();
        sink.write_chat("Alice", "123@c.us", &[record(1_759_363_200, "hi")])
            .unwrap();
        let path = sink.finish().unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("--- WHATSAPP MESSAGE EXPORT ---"));
        assert!(content.contains("Scope: chat 123@c.us"));
        assert!(content.contains("=== Alice (123@c.us) - 1 messages ==="));
        assert!(content.contains("] [551188888888@c.us] - hi"));
    }

    #[test]
    fn test_header_scope_uses_normalized_id() {
        let dir = tempfile::tempdir().unwrap();
        // The request still carries the raw id the caller typed; the header
        // must name the normalized one the sections use.
        let req = request(
            OutputFormat::Text,
            Scope::SingleChat("+55 11 99999-9999".into()),
        );

        let mut sink = ExportSink::create(dir.path(), &req, Some("5511999999999@c.us")).unwrap();
        sink.write_header(&req, Some("5511999999999@c.us")).unwrap();
        let path = sink.finish().unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Scope: chat 5511999999999@c.us"));
        assert!(!content.contains("+55 11"));
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(OutputFormat::Jsonl, Scope::AllChats);

        let mut sink = ExportSink::create(dir.path(), &req, None).unwrap();
        sink.write_chat("Alice", "123@c.us", &[record(1_759_363_200, "old")])
            .unwrap();
        let first = sink.finish().unwrap();

        let mut sink = ExportSink::create(dir.path(), &req, None).unwrap();
        sink.write_chat("Alice", "123@c.us", &[record(1_759_363_200, "new")])
            .unwrap();
        let second = sink.finish().unwrap();

        assert_eq!(first, second);
        let content = std::fs::read_to_string(second).unwrap();
        assert!(content.contains("new"));
        assert!(!content.contains("old"));
    }
}
