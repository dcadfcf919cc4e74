use thiserror::Error;

/// Failure to produce a device inventory. Malformed individual device
/// blocks never raise this; they are skipped during parsing. A total
/// failure means the enumeration command itself did not deliver output.
#[derive(Debug, Error)]
pub enum EnumerationError {
    /// The enumeration command could not be launched or exited non-zero.
    /// Carries the captured diagnostic stream verbatim.
    #[error("disk enumeration tool failed: {0}")]
    ToolLaunchFailed(String),

    /// The command ran but its output was not in the expected format.
    #[error("could not parse enumeration output: {0}")]
    ParseFailed(String),
}

#[derive(Debug, Error)]
pub enum FormatError {
    /// The device id did not name a physical drive with a numeric index.
    /// No tool is invoked in this case.
    #[error("invalid device id: {0}")]
    InvalidDeviceId(String),

    /// The partitioning tool could not be started, or its input script
    /// could not be written.
    #[error("partitioning tool could not be launched: {0}")]
    ToolLaunchFailed(String),

    /// The partitioning tool ran and exited non-zero. Carries the
    /// captured streams verbatim; that text is the only evidence of
    /// which step of the destructive sequence failed.
    #[error("partitioning tool failed: {0}")]
    ToolFailed(String),

    /// The confirmation gate refused the request: no affirmative
    /// decision, or the selected device is not in the current snapshot.
    #[error("format not confirmed for the selected device")]
    NotConfirmed,
}
