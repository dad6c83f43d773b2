//! JSONL file writer for query events.
//!
//! Each [`QueryEvent`] becomes one [`QueryRecord`] line: timestamp, event,
//! conversation id and the event data. Grepping a conversation id yields the
//! full history of that conversation across sessions.

use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use tradedesk_application::{QueryEvent, QueryLogger};

/// JSONL query logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Appends to an existing file so
/// one log can span several sessions. Flushes on `Drop`.
pub struct JsonlQueryLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlQueryLogger {
    /// Open (or create) the log at the given path.
    ///
    /// Creates parent directories if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create query log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open query log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One line of the query log.
#[derive(Debug, Serialize)]
struct QueryRecord<'a> {
    timestamp: String,
    event: &'a str,
    conversation_id: &'a str,
    #[serde(skip_serializing_if = "is_empty_data")]
    data: &'a Value,
}

fn is_empty_data(data: &&Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl QueryLogger for JsonlQueryLogger {
    fn log(&self, event: QueryEvent) {
        let record = QueryRecord {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            event: event.event_type,
            conversation_id: &event.conversation_id,
            data: &event.payload,
        };

        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!("Dropping {} event: {}", event.event_type, e);
                return;
            }
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlQueryLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_records_are_keyed_by_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("queries.jsonl");
        let logger = JsonlQueryLogger::new(&path).unwrap();
        assert_eq!(logger.path(), path.as_path());

        logger.log(QueryEvent::new(
            "plan_built",
            "c1",
            json!({"agents": ["tariff_analysis", "optimization"], "complexity": "MEDIUM"}),
        ));
        logger.log(QueryEvent::new(
            "query_completed",
            "c1",
            json!({"tools_used": ["tariff_analysis"], "processing_time_ms": 12}),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record["conversation_id"], "c1");
            assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
        }
        assert_eq!(records[0]["event"], "plan_built");
        assert_eq!(records[0]["data"]["agents"][1], "optimization");
        assert_eq!(records[1]["event"], "query_completed");
        assert_eq!(records[1]["data"]["processing_time_ms"], 12);
    }

    #[test]
    fn test_empty_data_is_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.jsonl");
        let logger = JsonlQueryLogger::new(&path).unwrap();

        logger.log(QueryEvent::new("query_degraded", "c9", json!({})));
        logger.log(QueryEvent::new("query_degraded", "c9", json!("timeout")));
        drop(logger);

        let records = read_lines(&path);
        assert!(records[0].get("data").is_none());
        assert_eq!(records[1]["data"], "timeout");
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.jsonl");

        for id in ["c1", "c2"] {
            let logger = JsonlQueryLogger::new(&path).unwrap();
            logger.log(QueryEvent::new("query_completed", id, json!({})));
        }

        let ids: Vec<Value> = read_lines(&path)
            .into_iter()
            .map(|r| r["conversation_id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("c1"), json!("c2")]);
    }

    #[test]
    fn test_unwritable_path_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        assert!(JsonlQueryLogger::new(blocker.join("queries.jsonl")).is_none());
    }
}
