//! Precondition check in front of every destructive operation.

use crate::device::{DeviceRecord, InventorySnapshot};

/// Returns true only when the user gave an explicit affirmative decision
/// for a selected device that is present in the given snapshot.
///
/// The snapshot must be the most recent one; a record kept from before a
/// refresh fails the membership check, which guards against a selection
/// index pointing at shifted data.
pub fn may_format(
    snapshot: &InventorySnapshot,
    selected: Option<&DeviceRecord>,
    confirmed: bool,
) -> bool {
    match selected {
        Some(record) => confirmed && snapshot.contains(&record.device_id),
        None => false,
    }
}
