use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::codec::raw_registers;
use crate::diff::diff_registers;
use crate::protocol::Command;

pub enum MessageLogMode {
    Full,
    /// Status responses after the first are logged as register changes.
    Diffed,
}

/// NDJSON record of every exchange with the device.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_status: Option<BTreeMap<u16, String>>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            mode,
            file,
            previous_status: None,
        })
    }

    pub fn log_request(&mut self, exchange: Uuid, command: Command, body: &Value) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "id": exchange.to_string(),
            "dir": "req",
            "cmd": command.id(),
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_response(&mut self, exchange: Uuid, command: Command, status: u16, body: &Value) {
        let mut entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "id": exchange.to_string(),
            "dir": "resp",
            "cmd": command.id(),
            "status": status,
        });

        let diffed = matches!(self.mode, MessageLogMode::Diffed) && command == Command::Status;
        let registers = if diffed { raw_registers(body).ok() } else { None };

        match (registers, self.previous_status.take()) {
            (Some(current), Some(previous)) => {
                let changes: Vec<Value> = diff_registers(&previous, &current)
                    .into_iter()
                    .map(|c| json!({ "reg": c.id, "old": c.old, "new": c.new }))
                    .collect();
                entry["changes"] = Value::Array(changes);
                self.previous_status = Some(current);
            }
            (Some(current), None) => {
                entry["full"] = json!(true);
                entry["body"] = body.clone();
                self.previous_status = Some(current);
            }
            (None, previous) => {
                entry["body"] = body.clone();
                self.previous_status = previous;
            }
        }

        self.write_line(&entry);
    }

    pub fn log_failure(&mut self, exchange: Uuid, command: Command, error: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "id": exchange.to_string(),
            "dir": "err",
            "cmd": command.id(),
            "error": error,
        });
        self.write_line(&entry);
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn read_lines(path: &str) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn log_request_writes_ndjson() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap();
        let mut logger = MessageLogger::new(MessageLogMode::Full, path).unwrap();
        let id = Uuid::new_v4();
        logger.log_request(id, Command::Status, &json!({"cmd": 4, "sn": "X"}));

        let lines = read_lines(path);
        assert_eq!(lines[0]["dir"], "req");
        assert_eq!(lines[0]["cmd"], 4);
        assert_eq!(lines[0]["id"], id.to_string());
        assert!(lines[0]["ts"].as_str().is_some());
    }

    #[test]
    fn diffed_mode_logs_full_first_then_changes() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap();
        let mut logger = MessageLogger::new(MessageLogMode::Diffed, path).unwrap();

        let body1 = json!({"par": [[5, 1, "210"], [31, 1, "198"]]});
        logger.log_response(Uuid::new_v4(), Command::Status, 200, &body1);
        let body2 = json!({"par": [[5, 1, "210"], [31, 1, "201"]]});
        logger.log_response(Uuid::new_v4(), Command::Status, 200, &body2);
        logger.log_response(Uuid::new_v4(), Command::Status, 200, &body2);

        let lines = read_lines(path);
        assert_eq!(lines[0]["full"], true);
        assert!(lines[0]["body"].is_object());
        let changes = lines[1]["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0]["reg"], 31);
        assert_eq!(changes[0]["old"], "198");
        assert_eq!(changes[0]["new"], "201");
        assert_eq!(lines[2]["changes"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn diffed_mode_logs_control_acks_in_full() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap();
        let mut logger = MessageLogger::new(MessageLogMode::Diffed, path).unwrap();
        logger.log_response(Uuid::new_v4(), Command::Control, 200, &json!({"success": "true"}));

        let lines = read_lines(path);
        assert_eq!(lines[0]["cmd"], 1);
        assert_eq!(lines[0]["body"]["success"], "true");
        assert!(lines[0].get("changes").is_none());
    }

    #[test]
    fn log_failure_records_error() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap();
        let mut logger = MessageLogger::new(MessageLogMode::Full, path).unwrap();
        logger.log_failure(Uuid::new_v4(), Command::Status, "device unreachable");

        let lines = read_lines(path);
        assert_eq!(lines[0]["dir"], "err");
        assert_eq!(lines[0]["error"], "device unreachable");
    }
}
