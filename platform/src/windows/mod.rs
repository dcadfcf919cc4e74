pub mod device;

pub use device::WmicDeviceEnumerator;
