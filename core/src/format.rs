use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::device::{DeviceEnumerator, InventorySnapshot};
use crate::error::{EnumerationError, FormatError};
use crate::gate::may_format;

/// Outcome of a completed format operation.
///
/// `output` is the partitioning tool's stdout verbatim. Callers are
/// expected to surface it unmodified: the tool reports step-by-step
/// progress there, and that text is the only evidence the multi-step
/// destructive sequence actually completed each step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatReport {
    pub device_id: String,
    /// The script handed to the tool, as written.
    pub script: String,
    pub output: String,
    /// Set when the temporary script file could not be deleted. Never
    /// masks the primary result.
    pub cleanup_warning: Option<String>,
}

/// Executes the destructive reinitialization of one device.
///
/// Precondition: the caller has passed [`may_format`] for this device.
/// Implementations perform no confirmation of their own and destroy all
/// data on the target.
#[async_trait::async_trait]
pub trait DriveFormatter: Send + Sync {
    async fn format(&self, device_id: &str) -> Result<FormatReport, FormatError>;
}

/// Caller-facing API tying inventory, confirmation gate, and formatter
/// together. Consumed by whatever presentation layer hosts the core.
pub struct FormatManager<E, F> {
    enumerator: E,
    formatter: F,
}

impl<E: DeviceEnumerator, F: DriveFormatter> FormatManager<E, F> {
    pub fn new(enumerator: E, formatter: F) -> Self {
        Self { enumerator, formatter }
    }

    pub async fn refresh_inventory(&mut self) -> Result<Arc<InventorySnapshot>, EnumerationError> {
        self.enumerator.refresh().await
    }

    pub fn current_inventory(&self) -> Option<Arc<InventorySnapshot>> {
        self.enumerator.current()
    }

    /// Runs the confirmation gate against the current snapshot, then
    /// formats. `confirmed` must carry an explicit user decision for the
    /// exact device named here; anything else is [`FormatError::NotConfirmed`]
    /// and the partitioning tool is never invoked.
    ///
    /// Device state changes under a successful format; callers should
    /// refresh the inventory afterwards.
    pub async fn request_format(
        &self,
        device_id: &str,
        confirmed: bool,
    ) -> Result<FormatReport, FormatError> {
        let snapshot = self.current_inventory().ok_or(FormatError::NotConfirmed)?;
        if !may_format(&snapshot, snapshot.get(device_id), confirmed) {
            return Err(FormatError::NotConfirmed);
        }
        self.formatter.format(device_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceRecord;
    use crate::test_utils::{FixedEnumerator, MockFormatter};

    fn usb_record() -> DeviceRecord {
        DeviceRecord {
            caption: "Test USB Drive".to_string(),
            device_id: r"\\.\PHYSICALDRIVE1".to_string(),
            size: Some(16 * 1_073_741_824),
        }
    }

    fn manager_with(formatter: MockFormatter) -> FormatManager<FixedEnumerator, MockFormatter> {
        let snapshot = InventorySnapshot::new(1, vec![usb_record()]);
        FormatManager::new(FixedEnumerator::new(snapshot), formatter)
    }

    #[tokio::test]
    async fn confirmed_request_reaches_the_formatter() {
        let formatter = MockFormatter::new();
        let calls = formatter.calls();
        let manager = manager_with(formatter);

        let report = manager
            .request_format(r"\\.\PHYSICALDRIVE1", true)
            .await
            .unwrap();
        assert_eq!(report.device_id, r"\\.\PHYSICALDRIVE1");
        assert_eq!(calls.lock().unwrap().as_slice(), [r"\\.\PHYSICALDRIVE1"]);
    }

    #[tokio::test]
    async fn unconfirmed_request_never_reaches_the_formatter() {
        let formatter = MockFormatter::new();
        let calls = formatter.calls();
        let manager = manager_with(formatter);

        let err = manager
            .request_format(r"\\.\PHYSICALDRIVE1", false)
            .await
            .unwrap_err();
        assert!(matches!(err, FormatError::NotConfirmed));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_device_id_is_refused() {
        let formatter = MockFormatter::new();
        let calls = formatter.calls();
        let manager = manager_with(formatter);

        let err = manager
            .request_format(r"\\.\PHYSICALDRIVE9", true)
            .await
            .unwrap_err();
        assert!(matches!(err, FormatError::NotConfirmed));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn formatter_failure_is_surfaced() {
        let manager = manager_with(MockFormatter::failing());
        let err = manager
            .request_format(r"\\.\PHYSICALDRIVE1", true)
            .await
            .unwrap_err();
        assert!(matches!(err, FormatError::ToolFailed(_)));
    }
}
