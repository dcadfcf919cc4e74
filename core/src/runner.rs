//! Process execution capability the device components depend on.
//!
//! Enumeration and formatting never spawn processes directly; they go
//! through [`CommandRunner`] so tests can substitute scripted output and
//! destructive tools are only reached through [`SystemRunner`].

use std::ffi::OsString;
use std::io;
use std::process::Command;

/// Captured result of one blocking tool invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Decodes stdout tolerantly; the console codepage is not assumed to
    /// be UTF-8 and undecodable bytes must not abort anything.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

pub trait CommandRunner: Send + Sync {
    /// Runs a command to completion, capturing both streams and the exit
    /// status. Blocks the caller until the tool exits.
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<CommandOutput>;
}

/// Runner backed by real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let output = cmd.output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
