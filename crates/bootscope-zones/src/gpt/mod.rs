//! GPT (GUID Partition Table) header detection
//!
//! Only the primary header at LBA 1 is recognized; partition entries are
//! never read.

/// GPT header fields needed to recognize a GPT disk
///
/// ```text
/// LBA 0:    Protective MBR (for backward compatibility)
/// LBA 1:    Primary GPT header
/// LBA 2-33: Partition entries array (not decoded)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GptHeader {
    /// GPT revision (usually 0x00010000)
    pub revision: u32,
    /// Header size in bytes (usually 92)
    pub header_size: u32,
    /// CRC32 checksum of header
    pub header_crc32: u32,
    /// Current LBA (location of this header)
    pub current_lba: u64,
    /// Number of partition entries
    pub num_partition_entries: u32,
}

impl GptHeader {
    /// GPT header signature
    pub const SIGNATURE: &'static [u8; 8] = b"EFI PART";

    /// Typical GPT header size
    pub const HEADER_SIZE: usize = 92;

    /// Parse GPT header from bytes, `None` if the signature is absent
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::HEADER_SIZE || &bytes[0..8] != Self::SIGNATURE {
            return None;
        }

        let u32_at = |o: usize| u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
        let mut lba = [0u8; 8];
        lba.copy_from_slice(&bytes[24..32]);

        Some(Self {
            revision: u32_at(8),
            header_size: u32_at(12),
            header_crc32: u32_at(16),
            current_lba: u64::from_le_bytes(lba),
            num_partition_entries: u32_at(80),
        })
    }

    /// Verify the header CRC32 checksum
    ///
    /// The CRC covers `header_size` bytes with the CRC field itself zeroed.
    pub fn verify_header_crc32(&self, header_bytes: &[u8]) -> bool {
        let size = self.header_size as usize;
        if size < Self::HEADER_SIZE || header_bytes.len() < size {
            return false;
        }

        let mut header_for_crc = header_bytes[..size].to_vec();
        header_for_crc[16..20].fill(0);

        crc32fast::hash(&header_for_crc) == self.header_crc32
    }
}
