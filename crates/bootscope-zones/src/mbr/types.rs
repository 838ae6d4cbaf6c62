//! MBR partition entries and the partition type registry

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes per sector assumed for every size calculation
pub const SECTOR_SIZE: u64 = 512;

/// Label returned for codes missing from the registry
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Type code of the single entry in a GPT protective MBR
pub const GPT_PROTECTIVE: u8 = 0xEE;

/// DOS partition type codes, sorted by code
const DOS_PARTITION_TYPES: &[(u8, &str)] = &[
    (0x00, "Empty"),
    (0x01, "FAT12, CHS"),
    (0x04, "FAT16, 16-32 MB, CHS"),
    (0x05, "Microsoft Extended, CHS"),
    (0x06, "FAT16, 32 MB-2GB, CHS"),
    (0x07, "NTFS"),
    (0x0B, "FAT32, CHS"),
    (0x0C, "FAT32, LBA"),
    (0x0E, "FAT16, 32 MB-2GB, LBA"),
    (0x0F, "Microsoft Extended, LBA"),
    (0x11, "Hidden FAT12, CHS"),
    (0x12, "Compaq Diagnostics"),
    (0x14, "Hidden FAT16, 16-32 MB, CHS"),
    (0x16, "Hidden FAT16, 32 MB-2GB, CHS"),
    (0x17, "Hidden NTFS"),
    (0x1B, "Hidden FAT32, CHS"),
    (0x1C, "Hidden FAT32, LBA"),
    (0x1E, "Hidden FAT16, 32 MB-2GB, LBA"),
    (0x27, "Windows Recovery Environment"),
    (0x42, "Microsoft MBR, Dynamic Disk"),
    (0x82, "Solaris x86 -or- Linux Swap"),
    (0x83, "Linux"),
    (0x84, "Hibernation"),
    (0x85, "Linux Extended"),
    (0x86, "NTFS Volume Set"),
    (0x87, "NTFS Volume Set"),
    (0x8E, "Linux LVM"),
    (0xA0, "Hibernation"),
    (0xA1, "Hibernation"),
    (0xA5, "FreeBSD"),
    (0xA6, "OpenBSD"),
    (0xA8, "Mac OSX"),
    (0xA9, "NetBSD"),
    (0xAB, "Mac OSX Boot"),
    (0xB7, "BSDI"),
    (0xB8, "BSDI swap"),
    (0xDB, "Recovery Partition"),
    (0xDE, "Dell Diagnostic Partition"),
    (0xEE, "EFI GPT Disk"),
    (0xEF, "EFI System Partition"),
    (0xFB, "Vmware File System"),
    (0xFC, "Vmware swap"),
    (0xFD, "Linux RAID autodetect"),
];

/// Look up the human-readable label for a partition type code
///
/// Total over `u8`: codes outside the table yield [`UNKNOWN_LABEL`].
pub fn label_for(code: u8) -> &'static str {
    DOS_PARTITION_TYPES
        .binary_search_by_key(&code, |&(c, _)| c)
        .map(|i| DOS_PARTITION_TYPES[i].1)
        .unwrap_or(UNKNOWN_LABEL)
}

/// Check whether a code has a documented label
pub fn is_known(code: u8) -> bool {
    DOS_PARTITION_TYPES
        .binary_search_by_key(&code, |&(c, _)| c)
        .is_ok()
}

/// Check whether a code denotes an extended (container) partition
pub fn is_extended(code: u8) -> bool {
    matches!(code, 0x05 | 0x0F | 0x85)
}

/// One 16-byte slot of the MBR partition table
///
/// CHS addresses are kept as raw bytes; nothing here checks them against the
/// LBA fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionEntry {
    /// Table slot, 0..=3 in on-disk order
    pub slot: usize,

    /// Boot indicator (0x80 active, 0x00 inactive)
    pub boot_flag: u8,

    /// Starting CHS address, verbatim
    pub start_chs: [u8; 3],

    /// Partition type code
    pub partition_type: u8,

    /// Ending CHS address, verbatim
    pub end_chs: [u8; 3],

    /// First absolute sector
    pub start_lba: u32,

    /// Length in sectors
    pub sector_count: u32,
}

impl PartitionEntry {
    /// Boot flag of an active partition
    pub const BOOTABLE: u8 = 0x80;

    /// Parse an entry from its 16 on-disk bytes
    pub fn from_bytes(slot: usize, bytes: &[u8; 16]) -> Self {
        Self {
            slot,
            boot_flag: bytes[0],
            start_chs: [bytes[1], bytes[2], bytes[3]],
            partition_type: bytes[4],
            end_chs: [bytes[5], bytes[6], bytes[7]],
            start_lba: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            sector_count: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        }
    }

    /// Serialize this entry back to its 16 on-disk bytes
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0] = self.boot_flag;
        bytes[1..4].copy_from_slice(&self.start_chs);
        bytes[4] = self.partition_type;
        bytes[5..8].copy_from_slice(&self.end_chs);
        bytes[8..12].copy_from_slice(&self.start_lba.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.sector_count.to_le_bytes());
        bytes
    }

    /// Label of the partition type
    pub fn type_label(&self) -> &'static str {
        label_for(self.partition_type)
    }

    /// Empty slot (type 0x00)
    pub fn is_empty(&self) -> bool {
        self.partition_type == 0x00
    }

    /// Active partition, i.e. boot flag exactly 0x80
    ///
    /// Any other non-zero flag is kept as read but does not count.
    pub fn is_bootable(&self) -> bool {
        self.boot_flag == Self::BOOTABLE
    }

    /// Size in bytes
    pub fn size_bytes(&self) -> u64 {
        self.sector_count as u64 * SECTOR_SIZE
    }

    /// Size in whole mebibytes, rounded down
    pub fn size_mb(&self) -> u64 {
        self.size_bytes() / (1024 * 1024)
    }

    /// Hex rendering of the starting CHS bytes, e.g. `0x000201`
    pub fn start_chs_hex(&self) -> String {
        format!("0x{}", hex::encode(self.start_chs))
    }

    /// Hex rendering of the ending CHS bytes
    pub fn end_chs_hex(&self) -> String {
        format!("0x{}", hex::encode(self.end_chs))
    }
}

impl fmt::Display for PartitionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Partition {}:", self.slot + 1)?;
        writeln!(f, "  Boot Flag: {:#x}", self.boot_flag)?;
        writeln!(f, "  Start CHS: {}", self.start_chs_hex())?;
        writeln!(f, "  End CHS: {}", self.end_chs_hex())?;
        writeln!(
            f,
            "  Partition Type: {:#x} ({})",
            self.partition_type,
            self.type_label()
        )?;
        writeln!(f, "  Start LBA: {}", self.start_lba)?;
        writeln!(f, "  Number of Sectors: {}", self.sector_count)?;
        write!(f, "  Estimated Size (MB): {}", self.size_mb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorted_and_unique() {
        assert!(DOS_PARTITION_TYPES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_label_for_documented_codes() {
        assert_eq!(label_for(0x00), "Empty");
        assert_eq!(label_for(0x07), "NTFS");
        assert_eq!(label_for(0x0C), "FAT32, LBA");
        assert_eq!(label_for(0x83), "Linux");
        assert_eq!(label_for(0xEE), "EFI GPT Disk");
        assert_eq!(label_for(0xFC), "Vmware swap");
    }

    #[test]
    fn test_label_capitalization() {
        assert_eq!(label_for(0x01), "FAT12, CHS");
        assert_eq!(label_for(0x11), "Hidden FAT12, CHS");
        assert_eq!(label_for(0x86), "NTFS Volume Set");
        assert_eq!(label_for(0x87), "NTFS Volume Set");
    }

    #[test]
    fn test_label_for_is_total() {
        for code in 0..=u8::MAX {
            let label = label_for(code);
            assert!(!label.is_empty());
            assert_eq!(is_known(code), label != UNKNOWN_LABEL);
        }
        assert_eq!(label_for(0x99), "Unknown");
        assert_eq!(label_for(0xFF), "Unknown");
    }

    #[test]
    fn test_is_extended() {
        assert!(is_extended(0x05));
        assert!(is_extended(0x0F));
        assert!(is_extended(0x85));
        assert!(!is_extended(0x83));
    }

    #[test]
    fn test_entry_from_bytes() {
        let bytes = [
            0x80, 0x20, 0x21, 0x00, 0x07, 0xFE, 0xFF, 0xFF,
            0x00, 0x08, 0x00, 0x00, 0x00, 0x20, 0x03, 0x00,
        ];
        let entry = PartitionEntry::from_bytes(0, &bytes);

        assert!(entry.is_bootable());
        assert_eq!(entry.start_chs, [0x20, 0x21, 0x00]);
        assert_eq!(entry.partition_type, 0x07);
        assert_eq!(entry.end_chs, [0xFE, 0xFF, 0xFF]);
        assert_eq!(entry.start_lba, 2048);
        assert_eq!(entry.sector_count, 204800);
        assert_eq!(entry.size_mb(), 100);
        assert_eq!(entry.start_chs_hex(), "0x202100");
        assert_eq!(entry.to_bytes(), bytes);
    }

    #[test]
    fn test_size_mb_rounds_down() {
        let mut entry = PartitionEntry::from_bytes(0, &[0u8; 16]);
        entry.sector_count = 2048;
        assert_eq!(entry.size_mb(), 1);
        entry.sector_count = 2047;
        assert_eq!(entry.size_mb(), 0);
        entry.sector_count = u32::MAX;
        assert_eq!(entry.size_mb(), 2_097_151);
    }

    #[test]
    fn test_non_standard_boot_flag() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0x7F;
        let entry = PartitionEntry::from_bytes(2, &bytes);
        assert!(!entry.is_bootable());
        assert_eq!(entry.boot_flag, 0x7F);
    }

    #[test]
    fn test_display_summary() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0x80;
        bytes[4] = 0x83;
        bytes[13] = 0x08;
        let text = PartitionEntry::from_bytes(1, &bytes).to_string();

        assert!(text.starts_with("Partition 2:"));
        assert!(text.contains("Boot Flag: 0x80"));
        assert!(text.contains("Start CHS: 0x000000"));
        assert!(text.contains("Partition Type: 0x83 (Linux)"));
        assert!(text.contains("Estimated Size (MB): 1"));
    }
}
