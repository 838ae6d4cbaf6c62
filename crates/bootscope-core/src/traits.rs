//! Core traits for Bootscope

use crate::error::DeviceError;
use crate::types::{DriveRecord, PartitioningScheme};
use std::collections::HashMap;
use std::io::{Read, Seek};

/// Host inventory of physical drives
pub trait DriveSource: Send + Sync {
    /// Get a human-readable identifier for this source
    fn identify(&self) -> &str;

    /// List the drives currently attached
    fn drives(&self) -> Result<Vec<DriveRecord>, DeviceError>;
}

/// Host lookup of partitioning schemes, keyed by device index
///
/// Queried independently of [`DriveSource`]; the catalog joins the two.
pub trait SchemeSource: Send + Sync {
    /// Get a human-readable identifier for this source
    fn identify(&self) -> &str;

    /// Map device index to partitioning scheme
    fn schemes(&self) -> Result<HashMap<u32, PartitioningScheme>, DeviceError>;
}

/// Combined trait for Read + Seek
pub trait ReadSeek: Read + Seek + Send {}

/// Blanket implementation for any type that implements Read + Seek
impl<T: Read + Seek + Send> ReadSeek for T {}
