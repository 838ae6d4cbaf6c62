//! Bootscope error types

use thiserror::Error;

/// Failure to decode a boot sector buffer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer is not exactly one 512-byte sector
    #[error("Invalid MBR data size: expected 512 bytes, got {actual}")]
    InvalidSize { actual: usize },
}

/// Failure to enumerate, select or read a storage device
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The device could not be opened or did not yield a full sector
    #[error("Failed to read MBR data from {device_id}")]
    Unreadable {
        device_id: String,
        #[source]
        cause: std::io::Error,
    },

    /// The device identifier carries no numeric index
    #[error("Device {device_id} has no resolvable index")]
    UnresolvedDeviceIndex { device_id: String },

    /// No listed device carries the requested index
    #[error("No device with index {index}")]
    NotListed { index: i64 },

    /// The host device inventory could not be queried
    #[error("Device enumeration failed: {0}")]
    Enumeration(String),
}

/// The main error type for Bootscope operations
#[derive(Error, Debug)]
pub enum Error {
    /// Boot sector decoding failed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Device access failed
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// I/O error on an image stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Bootscope operations
pub type Result<T> = std::result::Result<T, Error>;

impl DeviceError {
    /// Create an unreadable-device error
    pub fn unreadable(device_id: impl Into<String>, cause: std::io::Error) -> Self {
        DeviceError::Unreadable {
            device_id: device_id.into(),
            cause,
        }
    }

    /// Create an unresolved-index error
    pub fn unresolved(device_id: impl Into<String>) -> Self {
        DeviceError::UnresolvedDeviceIndex {
            device_id: device_id.into(),
        }
    }

    /// Create an enumeration error
    pub fn enumeration(msg: impl Into<String>) -> Self {
        DeviceError::Enumeration(msg.into())
    }
}
