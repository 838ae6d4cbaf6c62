//! Partitioning scheme classification from the first sectors of a disk

use crate::gpt::GptHeader;
use crate::mbr::{self, BOOT_SIGNATURE_OFFSET, GPT_PROTECTIVE, MBR_SIZE};
use bootscope_core::PartitioningScheme;

/// Classify a disk from its leading sectors (LBA 0, optionally LBA 1)
///
/// A GPT header at LBA 1 wins over the MBR signature, since GPT disks carry
/// a protective MBR. A signed MBR with a 0xEE entry is GPT as well, even
/// when LBA 1 is missing or holds no header (4096-byte sector disks keep the
/// header at byte 4096). Less than one full sector is `Unknown`.
pub fn classify(sectors: &[u8]) -> PartitioningScheme {
    if sectors.len() < MBR_SIZE {
        return PartitioningScheme::Unknown;
    }

    let lba1 = &sectors[MBR_SIZE..];
    if let Some(header) = GptHeader::from_bytes(lba1) {
        if !header.verify_header_crc32(lba1) {
            tracing::warn!("GPT header CRC32 mismatch, classifying as GPT anyway");
        }
        return PartitioningScheme::Gpt;
    }

    if sectors[BOOT_SIGNATURE_OFFSET] != 0x55 || sectors[BOOT_SIGNATURE_OFFSET + 1] != 0xAA {
        return PartitioningScheme::Raw;
    }

    let protective = mbr::decode(&sectors[..MBR_SIZE])
        .map(|entries| entries.iter().any(|e| e.partition_type == GPT_PROTECTIVE))
        .unwrap_or(false);
    if protective {
        tracing::debug!("Protective MBR without a GPT header at LBA 1");
        PartitioningScheme::Gpt
    } else {
        PartitioningScheme::Mbr
    }
}
