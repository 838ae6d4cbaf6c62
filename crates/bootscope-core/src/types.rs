//! Core types for Bootscope

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DeviceError;

/// Partitioning scheme of a whole device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitioningScheme {
    /// Legacy Master Boot Record
    Mbr,
    /// GUID Partition Table
    Gpt,
    /// No recognizable partition table
    Raw,
    /// Scheme could not be determined
    Unknown,
}

impl PartitioningScheme {
    /// Get the conventional short name for this scheme
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mbr => "MBR",
            Self::Gpt => "GPT",
            Self::Raw => "RAW",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PartitioningScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PartitioningScheme {
    type Err = std::convert::Infallible;

    /// Never fails: unrecognized styles are `Unknown`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "MBR" => Self::Mbr,
            "GPT" => Self::Gpt,
            "RAW" => Self::Raw,
            _ => Self::Unknown,
        })
    }
}

/// A physical drive as reported by the host inventory, before the scheme join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveRecord {
    /// Opaque, host-specific device identifier
    pub id: String,

    /// Model name
    pub model: String,

    /// Capacity in bytes
    pub size_bytes: u64,

    /// Number of partitions the host sees
    pub partition_count: u32,
}

/// A storage device as listed by the catalog
///
/// Built fresh on every enumeration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Opaque identifier, passed verbatim to the reader
    pub id: String,

    /// Numeric index extracted from `id`, if any
    pub index: Option<u32>,

    /// Model name
    pub display_name: String,

    /// Capacity in bytes
    pub size_bytes: u64,

    /// Number of partitions the host sees
    pub partition_count: u32,

    /// Partitioning scheme, `Unknown` when the scheme lookup had no entry
    pub partitioning_scheme: PartitioningScheme,
}

impl DeviceDescriptor {
    /// Index value used for display, `-1` when unresolved
    pub fn display_index(&self) -> i64 {
        self.index.map(i64::from).unwrap_or(-1)
    }

    /// Whole gibibytes, rounded down
    pub fn size_gb(&self) -> u64 {
        self.size_bytes / (1024 * 1024 * 1024)
    }

    /// Whether this device can be chosen by index
    pub fn is_selectable(&self) -> bool {
        self.index.is_some()
    }

    /// Identifier to hand to the reader
    ///
    /// Devices without a resolved index are listed for information only and
    /// refuse selection.
    pub fn readable_id(&self) -> std::result::Result<&str, DeviceError> {
        match self.index {
            Some(_) => Ok(&self.id),
            None => Err(DeviceError::unresolved(self.id.clone())),
        }
    }

    /// Selection-list line: `Device {index}: {model}: {scheme}`
    pub fn display_line(&self) -> String {
        format!(
            "Device {}: {}: {}",
            self.display_index(),
            self.display_name,
            self.partitioning_scheme
        )
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

/// Format size in human-readable format
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
