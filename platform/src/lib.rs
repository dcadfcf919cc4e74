pub mod windows;

pub use windows::WmicDeviceEnumerator;
