//! Drive reinitialization through `diskpart` in scripted mode.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use drivesmith_core::{
    CommandRunner, DriveFormatter, FormatError, FormatReport, LogSink, StatusSink,
    PHYSICAL_DRIVE_PREFIX,
};
use uuid::Uuid;

const DISKPART_PROGRAM: &str = "diskpart";

/// Wipes a physical drive, creates one primary partition spanning it,
/// quick-formats it as NTFS, marks it active and assigns the next free
/// drive letter. The whole sequence runs as a single diskpart script;
/// there is no step-level result parsing and no retry on failure.
///
/// Callers must hold an explicit user confirmation for the exact device
/// before invoking this. The formatter itself never asks.
pub struct DiskpartFormatter<R: CommandRunner> {
    runner: R,
    sink: Arc<dyn StatusSink>,
}

impl<R: CommandRunner> DiskpartFormatter<R> {
    pub fn new(runner: R) -> Self {
        Self::with_sink(runner, Arc::new(LogSink))
    }

    pub fn with_sink(runner: R, sink: Arc<dyn StatusSink>) -> Self {
        Self { runner, sink }
    }

    fn run_diskpart(&self, script_path: &Path) -> Result<String, FormatError> {
        self.sink
            .append(&format!("Executing: diskpart /s {}", script_path.display()));

        let args = [OsString::from("/s"), script_path.as_os_str().to_os_string()];
        let output = self
            .runner
            .run(DISKPART_PROGRAM, &args)
            .map_err(|e| FormatError::ToolLaunchFailed(format!("failed to run diskpart: {e}")))?;

        if !output.success {
            return Err(FormatError::ToolFailed(format!(
                "diskpart exited with {:?}\nstdout: {}\nstderr: {}",
                output.code,
                output.stdout_text(),
                output.stderr_text()
            )));
        }
        Ok(output.stdout_text())
    }
}

#[async_trait::async_trait]
impl<R: CommandRunner> DriveFormatter for DiskpartFormatter<R> {
    async fn format(&self, device_id: &str) -> Result<FormatReport, FormatError> {
        let index = disk_index(device_id)?;
        let script = compose_script(index);

        self.sink
            .append(&format!("Preparing diskpart script for disk {index} ({device_id})"));

        let mut script_file = ScriptFile::create(&script).map_err(|e| {
            FormatError::ToolLaunchFailed(format!("failed to write diskpart script: {e}"))
        })?;

        let result = self.run_diskpart(script_file.path());

        // The script file is removed before the result is inspected, so
        // both exit paths leave no temporary state behind. A removal
        // failure is reported as a warning and never masks the result.
        let cleanup_warning = script_file.remove();
        if let Some(warning) = &cleanup_warning {
            log::warn!("{}", warning);
            self.sink.append(warning);
        }

        let output = result?;
        self.sink.append("Format sequence completed.");
        Ok(FormatReport {
            device_id: device_id.to_string(),
            script,
            output,
            cleanup_warning,
        })
    }
}

/// Extracts the disk index diskpart addresses, e.g.
/// `\\.\PHYSICALDRIVE2` -> 2.
fn disk_index(device_id: &str) -> Result<u32, FormatError> {
    device_id
        .strip_prefix(PHYSICAL_DRIVE_PREFIX)
        .and_then(|rest| rest.parse::<u32>().ok())
        .ok_or_else(|| FormatError::InvalidDeviceId(device_id.to_string()))
}

/// The fixed directive sequence. Filesystem and partition scheme are by
/// design not parameterized; this tool supports exactly one workflow.
fn compose_script(disk_index: u32) -> String {
    format!(
        "select disk {disk_index}\n\
         clean\n\
         create partition primary\n\
         format fs=ntfs quick\n\
         active\n\
         assign\n\
         exit\n"
    )
}

/// Uniquely named script file in the temp directory, deleted on every
/// exit path. `remove` reports a deletion failure to the caller; `Drop`
/// is the backstop for early returns and panics.
struct ScriptFile {
    path: PathBuf,
    removed: bool,
}

impl ScriptFile {
    fn create(contents: &str) -> io::Result<Self> {
        let path = std::env::temp_dir().join(format!("drivesmith_diskpart_{}.txt", Uuid::new_v4()));
        std::fs::write(&path, contents)?;
        Ok(Self {
            path,
            removed: false,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn remove(&mut self) -> Option<String> {
        if self.removed {
            return None;
        }
        self.removed = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => None,
            Err(e) => Some(format!(
                "failed to remove diskpart script {}: {}",
                self.path.display(),
                e
            )),
        }
    }
}

impl Drop for ScriptFile {
    fn drop(&mut self) {
        if let Some(warning) = self.remove() {
            log::warn!("{}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_index_strips_the_physical_drive_prefix() {
        assert_eq!(disk_index(r"\\.\PHYSICALDRIVE0").unwrap(), 0);
        assert_eq!(disk_index(r"\\.\PHYSICALDRIVE2").unwrap(), 2);
        assert_eq!(disk_index(r"\\.\PHYSICALDRIVE17").unwrap(), 17);
    }

    #[test]
    fn disk_index_rejects_non_numeric_suffixes() {
        for id in [
            r"\\.\PHYSICALDRIVE",
            r"\\.\PHYSICALDRIVEabc",
            r"\\.\PHYSICALDRIVE2x",
            r"\\.\PHYSICALDRIVE-1",
            "/dev/sda",
            "",
        ] {
            assert!(
                matches!(disk_index(id), Err(FormatError::InvalidDeviceId(_))),
                "accepted {id:?}"
            );
        }
    }

    #[test]
    fn script_has_the_fixed_directive_sequence() {
        let script = compose_script(2);
        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(
            lines,
            [
                "select disk 2",
                "clean",
                "create partition primary",
                "format fs=ntfs quick",
                "active",
                "assign",
                "exit",
            ]
        );
    }

    #[test]
    fn script_file_is_gone_after_remove_and_drop_is_idempotent() {
        let mut file = ScriptFile::create("select disk 1\n").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());
        assert!(file.remove().is_none());
        assert!(!path.exists());
        // second remove (and the eventual Drop) must not report again
        assert!(file.remove().is_none());
    }
}
