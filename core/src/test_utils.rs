//! Mock implementations for safe testing. Nothing in here touches real
//! hardware or spawns a process.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::sync::{Arc, Mutex};

use crate::device::{DeviceEnumerator, InventorySnapshot};
use crate::error::{EnumerationError, FormatError};
use crate::format::{DriveFormatter, FormatReport};
use crate::runner::{CommandOutput, CommandRunner};

/// One scripted reaction of a [`ScriptedRunner`].
#[derive(Debug, Clone)]
pub enum RunnerResponse {
    Output(CommandOutput),
    /// Simulates the tool binary not being launchable at all.
    LaunchFailure(String),
}

impl RunnerResponse {
    pub fn success(stdout: &str) -> Self {
        RunnerResponse::Output(CommandOutput {
            success: true,
            code: Some(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }

    pub fn failure(stderr: &str) -> Self {
        RunnerResponse::Output(CommandOutput {
            success: false,
            code: Some(1),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        })
    }
}

/// Command runner that replays queued responses and records every
/// invocation. Clones share the queue and the call log, so a test can
/// keep a handle after moving the runner into a component.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    responses: Arc<Mutex<VecDeque<RunnerResponse>>>,
    calls: Arc<Mutex<Vec<(String, Vec<OsString>)>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeding(stdout: &str) -> Self {
        let runner = Self::new();
        runner.push(RunnerResponse::success(stdout));
        runner
    }

    pub fn failing(stderr: &str) -> Self {
        let runner = Self::new();
        runner.push(RunnerResponse::failure(stderr));
        runner
    }

    pub fn unlaunchable(message: &str) -> Self {
        let runner = Self::new();
        runner.push(RunnerResponse::LaunchFailure(message.to_string()));
        runner
    }

    pub fn push(&self, response: RunnerResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, Vec<OsString>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));

        match self.responses.lock().unwrap().pop_front() {
            Some(RunnerResponse::Output(output)) => Ok(output),
            Some(RunnerResponse::LaunchFailure(message)) => {
                Err(io::Error::new(io::ErrorKind::NotFound, message))
            }
            // Queue exhausted: succeed with empty output.
            None => Ok(CommandOutput {
                success: true,
                code: Some(0),
                stdout: Vec::new(),
                stderr: Vec::new(),
            }),
        }
    }
}

/// Enumerator that always serves the same snapshot.
pub struct FixedEnumerator {
    snapshot: Arc<InventorySnapshot>,
}

impl FixedEnumerator {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

#[async_trait::async_trait]
impl DeviceEnumerator for FixedEnumerator {
    async fn refresh(&mut self) -> Result<Arc<InventorySnapshot>, EnumerationError> {
        Ok(self.snapshot.clone())
    }

    fn current(&self) -> Option<Arc<InventorySnapshot>> {
        Some(self.snapshot.clone())
    }
}

/// Formatter that records the device ids it was asked to format.
pub struct MockFormatter {
    calls: Arc<Mutex<Vec<String>>>,
    should_fail: bool,
}

impl MockFormatter {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
        }
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

impl Default for MockFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DriveFormatter for MockFormatter {
    async fn format(&self, device_id: &str) -> Result<FormatReport, FormatError> {
        self.calls.lock().unwrap().push(device_id.to_string());

        if self.should_fail {
            return Err(FormatError::ToolFailed("mock tool failure".to_string()));
        }

        Ok(FormatReport {
            device_id: device_id.to_string(),
            script: String::new(),
            output: "mock format completed".to_string(),
            cleanup_warning: None,
        })
    }
}
