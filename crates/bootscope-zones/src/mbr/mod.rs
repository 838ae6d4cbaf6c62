//! MBR (Master Boot Record) partition table decoder

pub mod types;

use bootscope_core::{DecodeError, ReadSeek, Result};
use serde::Serialize;
use std::io::{Read, Seek, SeekFrom};
pub use types::{
    is_extended, is_known, label_for, PartitionEntry, GPT_PROTECTIVE, SECTOR_SIZE, UNKNOWN_LABEL,
};

/// Size of the MBR in bytes (always 512)
pub const MBR_SIZE: usize = 512;

/// Offset of the first partition entry
pub const PARTITION_TABLE_OFFSET: usize = 0x1BE;

/// Size of each partition entry
pub const PARTITION_ENTRY_SIZE: usize = 16;

/// Number of partition entries in MBR
pub const NUM_PARTITIONS: usize = 4;

/// Offset of the disk signature
pub const DISK_SIGNATURE_OFFSET: usize = 0x1B8;

/// Offset of the boot signature
pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;

/// The boot signature expected at offset 0x1FE (bytes `55 AA`)
pub const BOOT_SIGNATURE: u16 = 0xAA55;

/// Decode the four partition table entries of a boot sector
///
/// Extraction is purely positional: CHS/LBA consistency, overlaps and the
/// boot signature are never checked.
///
/// # Structure
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0x000   446   Bootstrap code
/// 0x1BE   16    Partition entry 1
/// 0x1CE   16    Partition entry 2
/// 0x1DE   16    Partition entry 3
/// 0x1EE   16    Partition entry 4
/// 0x1FE   2     Boot signature (0xAA55)
/// ```
///
/// # Errors
///
/// Returns [`DecodeError::InvalidSize`] unless `buffer` is exactly 512 bytes.
pub fn decode(buffer: &[u8]) -> std::result::Result<[PartitionEntry; NUM_PARTITIONS], DecodeError> {
    let sector: &[u8; MBR_SIZE] = buffer
        .try_into()
        .map_err(|_| DecodeError::InvalidSize {
            actual: buffer.len(),
        })?;

    Ok(std::array::from_fn(|slot| {
        let offset = PARTITION_TABLE_OFFSET + slot * PARTITION_ENTRY_SIZE;
        let mut raw = [0u8; PARTITION_ENTRY_SIZE];
        raw.copy_from_slice(&sector[offset..offset + PARTITION_ENTRY_SIZE]);
        PartitionEntry::from_bytes(slot, &raw)
    }))
}

/// Write an entry into its table slot of a 512-byte sector
///
/// The slot is taken from `entry.slot`.
pub fn encode_entry(sector: &mut [u8; MBR_SIZE], entry: &PartitionEntry) {
    let offset = PARTITION_TABLE_OFFSET + entry.slot * PARTITION_ENTRY_SIZE;
    sector[offset..offset + PARTITION_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
}

/// A decoded boot sector together with its signature fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootSectorReport {
    /// The four table entries in on-disk order
    pub entries: [PartitionEntry; NUM_PARTITIONS],

    /// Raw boot signature at 0x1FE
    pub boot_signature: u16,

    /// NT disk signature at 0x1B8
    pub disk_signature: u32,

    /// Whether `boot_signature` equals 0xAA55
    pub signature_valid: bool,
}

impl BootSectorReport {
    /// Entries whose slot is in use
    pub fn used_entries(&self) -> impl Iterator<Item = &PartitionEntry> {
        self.entries.iter().filter(|e| !e.is_empty())
    }

    /// Check if this MBR contains a GPT protective partition
    pub fn is_gpt_protective(&self) -> bool {
        self.entries.iter().any(|e| e.partition_type == GPT_PROTECTIVE)
    }
}

/// Decode a boot sector and record its signatures
///
/// A missing 0x55AA signature is logged and flagged, never fatal; all four
/// entries are still returned.
pub fn inspect(buffer: &[u8]) -> std::result::Result<BootSectorReport, DecodeError> {
    let entries = decode(buffer)?;

    let boot_signature = u16::from_le_bytes([
        buffer[BOOT_SIGNATURE_OFFSET],
        buffer[BOOT_SIGNATURE_OFFSET + 1],
    ]);
    let disk_signature = u32::from_le_bytes([
        buffer[DISK_SIGNATURE_OFFSET],
        buffer[DISK_SIGNATURE_OFFSET + 1],
        buffer[DISK_SIGNATURE_OFFSET + 2],
        buffer[DISK_SIGNATURE_OFFSET + 3],
    ]);

    let signature_valid = boot_signature == BOOT_SIGNATURE;
    if !signature_valid {
        tracing::warn!(
            "Boot signature mismatch: expected 0x{:04X}, got 0x{:04X}",
            BOOT_SIGNATURE,
            boot_signature
        );
    }

    Ok(BootSectorReport {
        entries,
        boot_signature,
        disk_signature,
        signature_valid,
    })
}

/// Read the first sector of a stream and inspect it
///
/// # Errors
///
/// Fails if the stream holds fewer than 512 bytes.
pub fn read_entries(stream: &mut dyn ReadSeek) -> Result<BootSectorReport> {
    stream.seek(SeekFrom::Start(0))?;
    let mut mbr = [0u8; MBR_SIZE];
    stream.read_exact(&mut mbr)?;

    Ok(inspect(&mbr)?)
}
