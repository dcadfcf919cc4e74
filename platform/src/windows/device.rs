//! Device enumeration through `wmic diskdrive` list-format output.

use std::ffi::OsString;
use std::sync::Arc;

use drivesmith_core::{
    CommandRunner, DeviceEnumerator, DeviceRecord, EnumerationError, InventorySnapshot, LogSink,
    StatusSink,
};

const WMIC_PROGRAM: &str = "wmic";
const WMIC_ARGS: [&str; 4] = ["diskdrive", "get", "Caption,DeviceID,Size", "/format:list"];

/// Enumerates physical drives by invoking the WMI command line client
/// and parsing its `key=value` block output into device records.
pub struct WmicDeviceEnumerator<R: CommandRunner> {
    runner: R,
    sink: Arc<dyn StatusSink>,
    generation: u64,
    snapshot: Option<Arc<InventorySnapshot>>,
}

impl<R: CommandRunner> WmicDeviceEnumerator<R> {
    pub fn new(runner: R) -> Self {
        Self::with_sink(runner, Arc::new(LogSink))
    }

    pub fn with_sink(runner: R, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            runner,
            sink,
            generation: 0,
            snapshot: None,
        }
    }
}

#[async_trait::async_trait]
impl<R: CommandRunner> DeviceEnumerator for WmicDeviceEnumerator<R> {
    async fn refresh(&mut self) -> Result<Arc<InventorySnapshot>, EnumerationError> {
        self.sink.append("Querying attached disk drives...");

        let args: Vec<OsString> = WMIC_ARGS.iter().map(OsString::from).collect();
        let output = self
            .runner
            .run(WMIC_PROGRAM, &args)
            .map_err(|e| EnumerationError::ToolLaunchFailed(format!("failed to run wmic: {e}")))?;

        if !output.success {
            let diagnostic = output.stderr_text();
            log::error!("wmic exited with {:?}: {}", output.code, diagnostic);
            return Err(EnumerationError::ToolLaunchFailed(diagnostic));
        }

        let text = output.stdout_text();
        let devices = parse_list_output(&text)?;

        self.generation += 1;
        let snapshot = Arc::new(InventorySnapshot::new(self.generation, devices));
        self.snapshot = Some(snapshot.clone());
        self.sink
            .append(&format!("Refresh complete. {} disks found.", snapshot.len()));
        Ok(snapshot)
    }

    fn current(&self) -> Option<Arc<InventorySnapshot>> {
        self.snapshot.clone()
    }
}

/// Accumulates the recognized fields of one device block.
#[derive(Default)]
struct WorkingRecord {
    caption: Option<String>,
    device_id: Option<String>,
    size: Option<String>,
    size_seen: bool,
}

impl WorkingRecord {
    fn is_complete(&self) -> bool {
        self.caption.is_some() && self.device_id.is_some() && self.size_seen
    }

    /// Finalizes the block. A record needs caption and device id;
    /// a missing or unparseable size is kept as `None` rather than
    /// dropping the device, since its identity is still actionable.
    fn flush(&mut self, records: &mut Vec<DeviceRecord>) {
        let block = std::mem::take(self);
        match (block.caption, block.device_id) {
            (Some(caption), Some(device_id)) => {
                let size = block.size.and_then(|raw| raw.parse::<u64>().ok());
                records.push(DeviceRecord {
                    caption,
                    device_id,
                    size,
                });
            }
            (caption, device_id) => {
                if caption.is_some() || device_id.is_some() || block.size_seen {
                    log::debug!("skipping incomplete device block");
                }
            }
        }
    }
}

/// Parses `/format:list` output: one `key=value` line per field, one
/// block per device.
///
/// Block boundaries are detected order-independently: a block ends when
/// all three fields have been seen, on a blank separator line, or when a
/// recognized key recurs before the block is complete (the layout wmic
/// produces when it omits a field). Lines without a separator and
/// unrecognized keys are ignored; values are split on the first `=` only
/// so captions containing `=` survive.
fn parse_list_output(text: &str) -> Result<Vec<DeviceRecord>, EnumerationError> {
    if !text.trim().is_empty() && !text.contains('=') {
        return Err(EnumerationError::ParseFailed(
            "output is not in key=value list format".to_string(),
        ));
    }

    let mut records = Vec::new();
    let mut block = WorkingRecord::default();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            block.flush(&mut records);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "Caption" => {
                if block.caption.is_some() {
                    block.flush(&mut records);
                }
                if !value.is_empty() {
                    block.caption = Some(value.to_string());
                }
            }
            "DeviceID" => {
                if block.device_id.is_some() {
                    block.flush(&mut records);
                }
                if !value.is_empty() {
                    block.device_id = Some(value.to_string());
                }
            }
            "Size" => {
                if block.size_seen {
                    block.flush(&mut records);
                }
                block.size_seen = true;
                if !value.is_empty() {
                    block.size = Some(value.to_string());
                }
            }
            _ => {}
        }

        if block.is_complete() {
            block.flush(&mut records);
        }
    }
    block.flush(&mut records);

    Ok(records)
}
