//! Log entries and the per-writer line buffering described in §4.6
//! `LogWriter` and §11 "Structured log buffering".

use std::io;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nebula_core::{AuditId, ExecutionId, LogId, UserId, WorkflowId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<nebula_execution::LogLevel> for LogLevel {
    fn from(value: nebula_execution::LogLevel) -> Self {
        match value {
            nebula_execution::LogLevel::Debug => LogLevel::Debug,
            nebula_execution::LogLevel::Info => LogLevel::Info,
            nebula_execution::LogLevel::Warn => LogLevel::Warn,
            nebula_execution::LogLevel::Error => LogLevel::Error,
        }
    }
}

/// `{id, workflowId, executionId?, level, message, moduleName?, fields,
/// createdAt}` (§3 "Log entry"). `id` is monotonically increasing within
/// a single recorder instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogId,
    pub workflow_id: WorkflowId,
    pub execution_id: Option<ExecutionId>,
    pub level: LogLevel,
    pub message: String,
    pub module_name: Option<String>,
    pub fields: Value,
    pub created_at: DateTime<Utc>,
}

/// `{id (strictly increasing), userId?, action, resourceType,
/// resourceId?, ipAddress, createdAt}` (§3 "Audit entry", P3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditId,
    pub user_id: Option<UserId>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
}

/// Filter for log `Query` (§4.6: "by workflow, execution, level, time range").
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub workflow_id: Option<WorkflowId>,
    pub execution_id: Option<ExecutionId>,
    pub level: Option<LogLevel>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl LogFilter {
    #[must_use]
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.workflow_id.is_none_or(|id| id == entry.workflow_id)
            && self.execution_id.is_none_or(|id| Some(id) == entry.execution_id)
            && self.level.is_none_or(|level| level == entry.level)
            && self.since.is_none_or(|since| entry.created_at >= since)
            && self.until.is_none_or(|until| entry.created_at <= until)
    }
}

/// Anything that can accept a finished log line, tagged with the
/// workflow/execution/level it was opened for. Implemented by the
/// concrete recorder; [`LogWriter`] is the `io::Write` front end callers
/// actually write bytes into.
pub trait LineSink: Send + Sync {
    fn accept_line(&self, workflow_id: WorkflowId, execution_id: Option<ExecutionId>, level: LogLevel, line: &str);
}

/// `io::Write` adapter returned by `LogWriter(workflowId, executionId,
/// level)` (§4.6). Buffers bytes until a `\n` is seen or the writer is
/// dropped, at which point the buffered line (if non-empty) is handed to
/// the sink as one log entry.
pub struct LogWriter {
    sink: Arc<dyn LineSink>,
    workflow_id: WorkflowId,
    execution_id: Option<ExecutionId>,
    level: LogLevel,
    buffer: Mutex<Vec<u8>>,
}

impl LogWriter {
    #[must_use]
    pub fn new(sink: Arc<dyn LineSink>, workflow_id: WorkflowId, execution_id: Option<ExecutionId>, level: LogLevel) -> Self {
        Self { sink, workflow_id, execution_id, level, buffer: Mutex::new(Vec::new()) }
    }

    fn flush_line(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(bytes);
        self.sink.accept_line(self.workflow_id, self.execution_id, self.level, line.trim_end_matches('\r'));
    }
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut pending = self.buffer.lock();
        for &byte in buf {
            if byte == b'\n' {
                let line = std::mem::take(&mut *pending);
                drop(pending);
                self.flush_line(&line);
                pending = self.buffer.lock();
            } else {
                pending.push(byte);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let remainder = std::mem::take(&mut *self.buffer.lock());
        self.flush_line(&remainder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::WorkflowId;
    use std::io::Write as _;
    use std::sync::Mutex as StdMutex;

    struct CollectingSink(StdMutex<Vec<(LogLevel, String)>>);

    impl LineSink for CollectingSink {
        fn accept_line(&self, _workflow_id: WorkflowId, _execution_id: Option<ExecutionId>, level: LogLevel, line: &str) {
            self.0.lock().unwrap().push((level, line.to_owned()));
        }
    }

    #[test]
    fn write_buffers_until_newline() {
        let sink = Arc::new(CollectingSink(StdMutex::new(Vec::new())));
        let mut writer = LogWriter::new(sink.clone(), WorkflowId::v4(), None, LogLevel::Info);
        write!(writer, "hello ").unwrap();
        assert!(sink.0.lock().unwrap().is_empty());
        writeln!(writer, "world").unwrap();
        let lines = sink.0.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].1, "hello world");
    }

    #[test]
    fn drop_flushes_a_partial_line() {
        let sink = Arc::new(CollectingSink(StdMutex::new(Vec::new())));
        {
            let mut writer = LogWriter::new(sink.clone(), WorkflowId::v4(), None, LogLevel::Warn);
            write!(writer, "no trailing newline").unwrap();
        }
        let lines = sink.0.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].1, "no trailing newline");
    }

    #[test]
    fn multiple_lines_in_one_write_each_flush_separately() {
        let sink = Arc::new(CollectingSink(StdMutex::new(Vec::new())));
        let mut writer = LogWriter::new(sink.clone(), WorkflowId::v4(), None, LogLevel::Debug);
        write!(writer, "line1\nline2\n").unwrap();
        let lines = sink.0.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].1, "line1");
        assert_eq!(lines[1].1, "line2");
    }
}
