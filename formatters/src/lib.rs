pub mod diskpart;

pub use diskpart::DiskpartFormatter;
