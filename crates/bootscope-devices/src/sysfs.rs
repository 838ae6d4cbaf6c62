//! Linux sysfs device sources
//!
//! Drives are listed from `<sysfs_root>/block`. A drive's identifier is its
//! `/dev/disk/by-diskseq/<N>` link when the kernel exposes a disk sequence
//! number, and its plain `/dev/<name>` node otherwise.

use crate::catalog::extract_device_index;
use crate::reader;
use bootscope_core::{DeviceError, DriveRecord, DriveSource, PartitioningScheme, SchemeSource};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Block device name prefixes that are not physical drives
const VIRTUAL_PREFIXES: &[&str] = &["loop", "ram", "zram", "dm-", "md", "sr", "nbd"];

/// Sectors in sysfs `size` attributes are always 512 bytes
const SYSFS_SECTOR_SIZE: u64 = 512;

/// Where to look for host devices
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Mount point of sysfs
    pub sysfs_root: PathBuf,
    /// Directory holding device nodes
    pub dev_root: PathBuf,
    /// Also list loop, RAM, device-mapper and optical devices
    pub include_virtual: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys"),
            dev_root: PathBuf::from("/dev"),
            include_virtual: false,
        }
    }
}

/// A block device directory under `<sysfs_root>/block`
struct BlockDevice {
    name: String,
    sys_dir: PathBuf,
}

impl BlockDevice {
    fn attr(&self, name: &str) -> Option<String> {
        read_attr(&self.sys_dir.join(name))
    }

    fn diskseq(&self) -> Option<u64> {
        self.attr("diskseq")?.parse().ok()
    }

    /// Identifier handed to the catalog and the reader
    fn device_id(&self, config: &DeviceConfig) -> String {
        let path = match self.diskseq() {
            Some(seq) => config
                .dev_root
                .join("disk")
                .join("by-diskseq")
                .join(seq.to_string()),
            None => config.dev_root.join(&self.name),
        };
        path.display().to_string()
    }

    fn node(&self, config: &DeviceConfig) -> PathBuf {
        config.dev_root.join(&self.name)
    }

    fn partition_count(&self) -> u32 {
        let Ok(entries) = fs::read_dir(&self.sys_dir) else {
            return 0;
        };
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().join("partition").is_file())
            .count() as u32
    }
}

fn read_attr(path: &Path) -> Option<String> {
    let value = fs::read_to_string(path).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn is_virtual(name: &str) -> bool {
    VIRTUAL_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// List block devices sorted by name
fn block_devices(config: &DeviceConfig) -> Result<Vec<BlockDevice>, DeviceError> {
    let block_dir = config.sysfs_root.join("block");
    let entries = fs::read_dir(&block_dir).map_err(|e| {
        DeviceError::enumeration(format!("cannot list {}: {}", block_dir.display(), e))
    })?;

    let mut devices: Vec<BlockDevice> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if !config.include_virtual && is_virtual(&name) {
                tracing::debug!("Skipping virtual block device {}", name);
                return None;
            }
            Some(BlockDevice {
                name,
                sys_dir: e.path(),
            })
        })
        .collect();

    devices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(devices)
}

/// Drive inventory read from sysfs attributes
#[derive(Debug, Clone, Default)]
pub struct SysfsDriveSource {
    config: DeviceConfig,
}

impl SysfsDriveSource {
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }
}

impl DriveSource for SysfsDriveSource {
    fn identify(&self) -> &str {
        "sysfs block devices"
    }

    fn drives(&self) -> Result<Vec<DriveRecord>, DeviceError> {
        let drives = block_devices(&self.config)?
            .into_iter()
            .map(|dev| {
                let sectors: u64 = dev
                    .attr("size")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);

                DriveRecord {
                    id: dev.device_id(&self.config),
                    model: dev
                        .attr("device/model")
                        .unwrap_or_else(|| "Unknown".to_string()),
                    size_bytes: sectors * SYSFS_SECTOR_SIZE,
                    partition_count: dev.partition_count(),
                }
            })
            .collect();

        Ok(drives)
    }
}

/// Scheme lookup that probes the first two sectors of every drive
///
/// Drives that cannot be read are left out of the map.
#[derive(Debug, Clone, Default)]
pub struct SysfsSchemeSource {
    config: DeviceConfig,
}

impl SysfsSchemeSource {
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }
}

impl SchemeSource for SysfsSchemeSource {
    fn identify(&self) -> &str {
        "boot sector probe"
    }

    fn schemes(&self) -> Result<HashMap<u32, PartitioningScheme>, DeviceError> {
        let mut schemes = HashMap::new();

        for dev in block_devices(&self.config)? {
            let Some(index) = extract_device_index(&dev.device_id(&self.config)) else {
                continue;
            };

            let node = dev.node(&self.config);
            match reader::read_sectors(&node.display().to_string(), 2) {
                Ok(sectors) => {
                    let scheme = bootscope_zones::classify(&sectors);
                    tracing::debug!("{} classified as {}", dev.name, scheme);
                    schemes.insert(index, scheme);
                }
                Err(DeviceError::Unreadable { cause, .. }) => {
                    tracing::warn!("Cannot probe {}: {}", dev.name, cause)
                }
                Err(e) => tracing::warn!("Cannot probe {}: {}", dev.name, e),
            }
        }

        Ok(schemes)
    }
}
