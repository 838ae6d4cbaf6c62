//! Boot sector reads from raw devices and image files
//!
//! Every read opens its own handle and drops it before returning.

use bootscope_core::DeviceError;
use std::fs::File;
use std::io::{self, Read};

/// Bytes per sector read from a device
pub const SECTOR_SIZE: usize = 512;

type Result<T> = std::result::Result<T, DeviceError>;

/// Read exactly the first 512 bytes of a device
///
/// # Errors
///
/// Returns [`DeviceError::Unreadable`] when the device cannot be opened
/// (missing, permission denied) or holds fewer than 512 bytes. Short reads
/// are never padded.
pub fn read_boot_sector(device_id: &str) -> Result<[u8; SECTOR_SIZE]> {
    let mut sector = [0u8; SECTOR_SIZE];
    read_prefix(device_id, &mut sector)?;
    Ok(sector)
}

/// Read the first `count` sectors of a device
///
/// Same failure rules as [`read_boot_sector`].
pub fn read_sectors(device_id: &str, count: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; count * SECTOR_SIZE];
    read_prefix(device_id, &mut buffer)?;
    Ok(buffer)
}

fn read_prefix(device_id: &str, buffer: &mut [u8]) -> Result<()> {
    tracing::debug!("Reading {} bytes from {}", buffer.len(), device_id);

    let mut file = File::open(device_id).map_err(|e| DeviceError::unreadable(device_id, e))?;
    fill_from(&mut file, buffer).map_err(|e| DeviceError::unreadable(device_id, e))
}

/// Fill `buffer` completely from `source`
///
/// Unlike `read_exact`, the error of a short read names how many bytes were
/// available.
pub fn fill_from<R: Read>(source: &mut R, buffer: &mut [u8]) -> io::Result<()> {
    let mut filled = 0;

    while filled < buffer.len() {
        match source.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    if filled < buffer.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("short read: {} of {} bytes available", filled, buffer.len()),
        ));
    }

    Ok(())
}
