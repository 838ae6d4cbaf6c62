//! Host device access crate
//!
//! Provides functionality for:
//! - Listing physical drives and their partitioning schemes
//! - Reading the boot sector of a selected device
//!
//! Device listings come from Linux sysfs by default; other hosts plug in
//! through [`bootscope_core::DriveSource`] and [`bootscope_core::SchemeSource`].

pub mod catalog;
pub mod reader;
pub mod sysfs;

pub use catalog::{display_lines, extract_device_index, DeviceCatalog};
pub use reader::{read_boot_sector, read_sectors};
pub use sysfs::{DeviceConfig, SysfsDriveSource, SysfsSchemeSource};
