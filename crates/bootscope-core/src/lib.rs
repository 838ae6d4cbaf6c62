//! # Bootscope Core
//!
//! Core traits, types, and error handling for Bootscope.
//!
//! This crate provides the shared vocabulary of the workspace:
//! - **Errors**: decode failures, device failures, and the umbrella [`Error`]
//! - **Devices**: [`DeviceDescriptor`] and the [`PartitioningScheme`] of a disk
//! - **Sources**: the [`DriveSource`] and [`SchemeSource`] host inventories
//!
//! ## Example
//!
//! ```rust
//! use bootscope_core::{DeviceDescriptor, PartitioningScheme};
//!
//! let dev = DeviceDescriptor {
//!     id: "/dev/disk/by-diskseq/1".to_string(),
//!     index: Some(1),
//!     display_name: "QEMU HARDDISK".to_string(),
//!     size_bytes: 8 << 30,
//!     partition_count: 1,
//!     partitioning_scheme: PartitioningScheme::Mbr,
//! };
//! assert_eq!(dev.display_line(), "Device 1: QEMU HARDDISK: MBR");
//! ```

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use error::{DecodeError, DeviceError, Error, Result};
pub use traits::{DriveSource, ReadSeek, SchemeSource};
pub use types::{format_size, DeviceDescriptor, DriveRecord, PartitioningScheme};
