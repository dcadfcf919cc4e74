pub mod device;
pub mod error;
pub mod format;
pub mod gate;
pub mod runner;
pub mod status;
pub mod test_utils;

pub use device::{DeviceEnumerator, DeviceRecord, InventorySnapshot, PHYSICAL_DRIVE_PREFIX};
pub use error::{EnumerationError, FormatError};
pub use format::{DriveFormatter, FormatManager, FormatReport};
pub use gate::may_format;
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use status::{LogSink, MemorySink, StatusSink};
