//! Append-line status reporting, injected so the components can emit
//! progress text without owning a presentation surface.

use std::sync::Mutex;

pub trait StatusSink: Send + Sync {
    fn append(&self, line: &str);
}

/// Default sink: forwards status lines to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn append(&self, line: &str) {
        log::info!("{}", line);
    }
}

/// Captures status lines in memory for assertions in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl StatusSink for MemorySink {
    fn append(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
