use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::EnumerationError;

/// Path prefix the OS assigns to physical drives, e.g. `\\.\PHYSICALDRIVE2`.
pub const PHYSICAL_DRIVE_PREFIX: &str = r"\\.\PHYSICALDRIVE";

const GIB: f64 = 1_073_741_824.0;

/// One physical storage device as reported by the OS at enumeration time.
///
/// `device_id` is the only value ever passed into destructive operations;
/// `caption` is display text and carries no identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub caption: String,
    pub device_id: String,
    /// Reported size in bytes. `None` when the enumeration output carried
    /// no parseable size; the device is still listed, just flagged.
    pub size: Option<u64>,
}

impl DeviceRecord {
    /// Size in GiB rounded to two decimals. Display only, never identity.
    pub fn size_gib(&self) -> Option<f64> {
        self.size.map(|bytes| (bytes as f64 / GIB * 100.0).round() / 100.0)
    }

    pub fn display_line(&self) -> String {
        match self.size_gib() {
            Some(gib) => format!("{} ({} GiB) - {}", self.caption, gib, self.device_id),
            None => format!("{} (size unknown) - {}", self.caption, self.device_id),
        }
    }
}

/// Immutable result of one inventory refresh.
///
/// A refresh always produces a brand-new snapshot with a higher generation;
/// holders of an old snapshot detect staleness by generation, not by
/// diffing device lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    generation: u64,
    devices: Vec<DeviceRecord>,
}

impl InventorySnapshot {
    /// Builds a snapshot, keeping the first record per device id.
    pub fn new(generation: u64, devices: Vec<DeviceRecord>) -> Self {
        let mut seen = HashSet::new();
        let devices = devices
            .into_iter()
            .filter(|d| seen.insert(d.device_id.clone()))
            .collect();
        Self { generation, devices }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceRecord> {
        self.devices.iter().find(|d| d.device_id == device_id)
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.get(device_id).is_some()
    }
}

#[async_trait::async_trait]
pub trait DeviceEnumerator: Send + Sync {
    /// Replaces the held snapshot on success. On failure the previously
    /// held snapshot stays untouched so the caller keeps its
    /// last-known-good inventory.
    async fn refresh(&mut self) -> Result<Arc<InventorySnapshot>, EnumerationError>;

    /// The most recent successful snapshot, if any refresh succeeded yet.
    fn current(&self) -> Option<Arc<InventorySnapshot>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, size: Option<u64>) -> DeviceRecord {
        DeviceRecord {
            caption: "Test Disk".to_string(),
            device_id: id.to_string(),
            size,
        }
    }

    #[test]
    fn size_gib_rounds_to_two_decimals() {
        let r = record(r"\\.\PHYSICALDRIVE1", Some(107_374_182_400));
        assert_eq!(r.size_gib(), Some(100.0));

        let r = record(r"\\.\PHYSICALDRIVE1", Some(16_008_609_792));
        assert_eq!(r.size_gib(), Some(14.91));
    }

    #[test]
    fn size_gib_absent_when_size_unknown() {
        let r = record(r"\\.\PHYSICALDRIVE1", None);
        assert_eq!(r.size_gib(), None);
        assert!(r.display_line().contains("size unknown"));
    }

    #[test]
    fn zero_size_devices_are_valid() {
        let r = record(r"\\.\PHYSICALDRIVE3", Some(0));
        assert_eq!(r.size_gib(), Some(0.0));
    }

    #[test]
    fn snapshot_keeps_one_record_per_device_id() {
        let snapshot = InventorySnapshot::new(
            1,
            vec![
                record(r"\\.\PHYSICALDRIVE0", Some(10)),
                record(r"\\.\PHYSICALDRIVE1", Some(20)),
                record(r"\\.\PHYSICALDRIVE0", Some(30)),
            ],
        );
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(r"\\.\PHYSICALDRIVE0").unwrap().size, Some(10));
    }

    #[test]
    fn snapshot_lookup_by_device_id() {
        let snapshot = InventorySnapshot::new(7, vec![record(r"\\.\PHYSICALDRIVE2", None)]);
        assert_eq!(snapshot.generation(), 7);
        assert!(snapshot.contains(r"\\.\PHYSICALDRIVE2"));
        assert!(!snapshot.contains(r"\\.\PHYSICALDRIVE9"));
    }
}
