//! # Bootscope Zones
//!
//! Partition table handling for Bootscope.
//!
//! This crate provides:
//! - **MBR**: the four-entry Master Boot Record table decoder and the DOS
//!   partition type registry
//! - **GPT**: header recognition (no entry decoding)
//! - **Scheme**: classification of a disk as MBR, GPT or RAW
//!
//! ## Example
//!
//! ```rust,no_run
//! use bootscope_zones::mbr;
//!
//! let sector = std::fs::read("disk.img").unwrap();
//! let entries = mbr::decode(&sector[..512]).unwrap();
//!
//! for entry in &entries {
//!     println!("{}", entry);
//! }
//! ```

pub mod gpt;
pub mod mbr;
pub mod scheme;

pub use gpt::GptHeader;
pub use mbr::{decode, inspect, label_for, BootSectorReport, PartitionEntry};
pub use scheme::classify;
