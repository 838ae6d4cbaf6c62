//! Device catalog: drive inventory joined with partitioning schemes

use crate::sysfs::{DeviceConfig, SysfsDriveSource, SysfsSchemeSource};
use bootscope_core::{DeviceDescriptor, DeviceError, DriveSource, PartitioningScheme, SchemeSource};
use std::collections::{BTreeMap, HashMap};

type Result<T> = std::result::Result<T, DeviceError>;

/// Reduce a device identifier to its numeric index
///
/// Every non-digit character of the identifier's last path component is
/// dropped and the remaining digits parsed, so `\\.\PHYSICALDRIVE2` and
/// `/dev/disk/by-diskseq/2` both yield 2. `None` when no digits remain or
/// the number overflows.
pub fn extract_device_index(id: &str) -> Option<u32> {
    let name = id.rsplit(['/', '\\']).find(|s| !s.is_empty()).unwrap_or(id);
    let digits: String = name.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Indices carried by more than one device, ascending
fn duplicate_indices(devices: &[DeviceDescriptor]) -> Vec<u32> {
    let mut seen: BTreeMap<u32, usize> = BTreeMap::new();
    for index in devices.iter().filter_map(|d| d.index) {
        *seen.entry(index).or_default() += 1;
    }
    seen.into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(index, _)| index)
        .collect()
}

/// Selection-list lines for a device listing
pub fn display_lines(devices: &[DeviceDescriptor]) -> Vec<String> {
    devices.iter().map(DeviceDescriptor::display_line).collect()
}

/// Catalog of the storage devices attached to the host
///
/// Drives and schemes come from two independent sources joined by device
/// index. Missing scheme data never fails the listing; such devices are
/// reported with [`PartitioningScheme::Unknown`].
pub struct DeviceCatalog {
    drives: Box<dyn DriveSource>,
    schemes: Box<dyn SchemeSource>,
}

impl DeviceCatalog {
    /// Create a catalog over arbitrary sources
    pub fn new(drives: Box<dyn DriveSource>, schemes: Box<dyn SchemeSource>) -> Self {
        Self { drives, schemes }
    }

    /// Create a catalog over the host's sysfs sources
    pub fn from_config(config: DeviceConfig) -> Self {
        Self::new(
            Box::new(SysfsDriveSource::new(config.clone())),
            Box::new(SysfsSchemeSource::new(config)),
        )
    }

    /// Enumerate devices
    ///
    /// # Errors
    ///
    /// Fails only when the drive inventory itself cannot be queried.
    pub fn list_devices(&self) -> Result<Vec<DeviceDescriptor>> {
        let drives = self.drives.drives()?;

        let schemes = self.schemes.schemes().unwrap_or_else(|e| {
            tracing::warn!(
                "Scheme lookup via {} failed, reporting all schemes as Unknown: {}",
                self.schemes.identify(),
                e
            );
            HashMap::new()
        });

        let devices: Vec<DeviceDescriptor> = drives
            .into_iter()
            .map(|drive| {
                let index = extract_device_index(&drive.id);
                let partitioning_scheme = index
                    .and_then(|i| schemes.get(&i).copied())
                    .unwrap_or(PartitioningScheme::Unknown);

                if index.is_none() {
                    tracing::warn!("No numeric index in device id {}", drive.id);
                }
                tracing::debug!(
                    "Found {} ({}, {} bytes, {})",
                    drive.id,
                    drive.model,
                    drive.size_bytes,
                    partitioning_scheme
                );

                DeviceDescriptor {
                    id: drive.id,
                    index,
                    display_name: drive.model,
                    size_bytes: drive.size_bytes,
                    partition_count: drive.partition_count,
                    partitioning_scheme,
                }
            })
            .collect();

        for index in duplicate_indices(&devices) {
            tracing::warn!(
                "Several devices share index {}, its scheme and selection refer to the first",
                index
            );
        }

        Ok(devices)
    }

    /// Pick a listed device by its resolved index
    ///
    /// When several devices share `index`, the first listed one is returned.
    ///
    /// # Errors
    ///
    /// [`DeviceError::NotListed`] if no device carries `index`.
    pub fn select(&self, index: u32) -> Result<DeviceDescriptor> {
        self.list_devices()?
            .into_iter()
            .find(|d| d.index == Some(index))
            .ok_or(DeviceError::NotListed {
                index: index.into(),
            })
    }

    /// Turn an index as shown in the listing into a readable device id
    ///
    /// `-1` names the devices whose index did not resolve. Those are listed
    /// for information only, so choosing one fails.
    ///
    /// # Errors
    ///
    /// - [`DeviceError::UnresolvedDeviceIndex`] for `-1` when such a device
    ///   is listed
    /// - [`DeviceError::NotListed`] when nothing is listed under the index
    pub fn resolve(&self, display_index: i64) -> Result<String> {
        let device = match u32::try_from(display_index) {
            Ok(index) => self.select(index)?,
            Err(_) => self
                .list_devices()?
                .into_iter()
                .find(|d| d.display_index() == display_index)
                .ok_or(DeviceError::NotListed {
                    index: display_index,
                })?,
        };

        Ok(device.readable_id()?.to_string())
    }
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self::from_config(DeviceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysfs::tests::{mbr_disk, FakeHost};
    use bootscope_core::DriveRecord;

    struct FixedDrives(Vec<DriveRecord>);

    impl DriveSource for FixedDrives {
        fn identify(&self) -> &str {
            "fixed"
        }

        fn drives(&self) -> Result<Vec<DriveRecord>> {
            Ok(self.0.clone())
        }
    }

    struct FixedSchemes(Option<HashMap<u32, PartitioningScheme>>);

    impl SchemeSource for FixedSchemes {
        fn identify(&self) -> &str {
            "fixed"
        }

        fn schemes(&self) -> Result<HashMap<u32, PartitioningScheme>> {
            self.0
                .clone()
                .ok_or_else(|| DeviceError::enumeration("scheme query failed"))
        }
    }

    fn drive(id: &str, model: &str) -> DriveRecord {
        DriveRecord {
            id: id.to_string(),
            model: model.to_string(),
            size_bytes: 256 * 1024 * 1024 * 1024,
            partition_count: 3,
        }
    }

    fn windows_drives() -> Vec<DriveRecord> {
        (0..4)
            .map(|i| drive(&format!(r"\\.\PHYSICALDRIVE{}", i), &format!("Disk {}", i)))
            .collect()
    }

    #[test]
    fn test_extract_device_index() {
        assert_eq!(extract_device_index(r"\\.\PHYSICALDRIVE2"), Some(2));
        assert_eq!(extract_device_index("/dev/disk/by-diskseq/14"), Some(14));
        assert_eq!(extract_device_index("/tmp/run1/dev/disk/by-diskseq/3"), Some(3));
        assert_eq!(extract_device_index("nvme0n1"), Some(1));
        assert_eq!(extract_device_index("/dev/sda"), None);
        assert_eq!(extract_device_index(""), None);
        assert_eq!(extract_device_index("disk99999999999"), None);
    }

    #[test]
    fn test_join_by_index() {
        let schemes = HashMap::from([
            (0, PartitioningScheme::Gpt),
            (1, PartitioningScheme::Mbr),
            (2, PartitioningScheme::Raw),
            (3, PartitioningScheme::Gpt),
        ]);
        let catalog = DeviceCatalog::new(
            Box::new(FixedDrives(windows_drives())),
            Box::new(FixedSchemes(Some(schemes))),
        );

        let devices = catalog.list_devices().unwrap();
        assert_eq!(
            display_lines(&devices),
            vec![
                "Device 0: Disk 0: GPT",
                "Device 1: Disk 1: MBR",
                "Device 2: Disk 2: RAW",
                "Device 3: Disk 3: GPT",
            ]
        );
    }

    #[test]
    fn test_missing_scheme_is_unknown() {
        let schemes = HashMap::from([
            (0, PartitioningScheme::Gpt),
            (1, PartitioningScheme::Mbr),
            (2, PartitioningScheme::Mbr),
        ]);
        let catalog = DeviceCatalog::new(
            Box::new(FixedDrives(windows_drives())),
            Box::new(FixedSchemes(Some(schemes))),
        );

        let devices = catalog.list_devices().unwrap();
        assert_eq!(devices.len(), 4);
        assert_eq!(devices[3].index, Some(3));
        assert_eq!(devices[3].partitioning_scheme, PartitioningScheme::Unknown);
        assert_eq!(devices[2].partitioning_scheme, PartitioningScheme::Mbr);
    }

    #[test]
    fn test_failed_scheme_source_is_not_fatal() {
        let catalog = DeviceCatalog::new(
            Box::new(FixedDrives(windows_drives())),
            Box::new(FixedSchemes(None)),
        );

        let devices = catalog.list_devices().unwrap();
        assert_eq!(devices.len(), 4);
        assert!(devices
            .iter()
            .all(|d| d.partitioning_scheme == PartitioningScheme::Unknown));
    }

    #[test]
    fn test_unresolved_index_still_listed() {
        let catalog = DeviceCatalog::new(
            Box::new(FixedDrives(vec![drive("/dev/sda", "Mystery Disk"), drive("/dev/sdb1", "USB")])),
            Box::new(FixedSchemes(Some(HashMap::from([(1, PartitioningScheme::Mbr)])))),
        );

        let devices = catalog.list_devices().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].index, None);
        assert_eq!(devices[0].display_line(), "Device -1: Mystery Disk: Unknown");
        assert!(matches!(
            devices[0].readable_id(),
            Err(DeviceError::UnresolvedDeviceIndex { .. })
        ));
        assert_eq!(devices[1].display_line(), "Device 1: USB: MBR");
    }

    #[test]
    fn test_select() {
        let catalog = DeviceCatalog::new(
            Box::new(FixedDrives(windows_drives())),
            Box::new(FixedSchemes(Some(HashMap::new()))),
        );

        let dev = catalog.select(2).unwrap();
        assert_eq!(dev.readable_id().unwrap(), r"\\.\PHYSICALDRIVE2");
        assert!(matches!(
            catalog.select(9),
            Err(DeviceError::NotListed { index: 9 })
        ));
    }

    #[test]
    fn test_resolve_unresolved_device_is_refused() {
        let catalog = DeviceCatalog::new(
            Box::new(FixedDrives(vec![drive("/dev/sda", "Mystery Disk"), drive("/dev/sdb1", "USB")])),
            Box::new(FixedSchemes(Some(HashMap::new()))),
        );

        match catalog.resolve(-1) {
            Err(DeviceError::UnresolvedDeviceIndex { device_id }) => assert_eq!(device_id, "/dev/sda"),
            other => panic!("expected UnresolvedDeviceIndex, got {:?}", other),
        }
        assert_eq!(catalog.resolve(1).unwrap(), "/dev/sdb1");
        assert!(matches!(
            catalog.resolve(-7),
            Err(DeviceError::NotListed { index: -7 })
        ));
    }

    #[test]
    fn test_resolve_sentinel_without_unresolved_devices() {
        let catalog = DeviceCatalog::new(
            Box::new(FixedDrives(windows_drives())),
            Box::new(FixedSchemes(Some(HashMap::new()))),
        );

        assert!(matches!(
            catalog.resolve(-1),
            Err(DeviceError::NotListed { index: -1 })
        ));
        assert_eq!(catalog.resolve(3).unwrap(), r"\\.\PHYSICALDRIVE3");
    }

    #[test]
    fn test_duplicate_indices() {
        let catalog = DeviceCatalog::new(
            Box::new(FixedDrives(vec![
                drive("/dev/nvme1n1", "First"),
                drive("/dev/disk/by-diskseq/11", "Second"),
                drive("/dev/disk/by-diskseq/4", "Third"),
                drive("/dev/sda", "Fourth"),
            ])),
            Box::new(FixedSchemes(Some(HashMap::from([(11, PartitioningScheme::Gpt)])))),
        );

        let devices = catalog.list_devices().unwrap();
        assert_eq!(duplicate_indices(&devices), vec![11]);
        assert_eq!(catalog.select(11).unwrap().display_name, "First");
    }

    #[test]
    fn test_sysfs_catalog_end_to_end() {
        let host = FakeHost::new();
        host.add_disk("sda", Some(1), Some("QEMU HARDDISK"), 2, 1, Some(&mbr_disk()[..]));
        host.add_disk("sdb", Some(2), Some("Kingston"), 2, 0, None);
        host.add_disk("sdc", None, Some("Legacy"), 2, 0, Some(&mbr_disk()[..]));

        let catalog = DeviceCatalog::from_config(host.config());
        let lines = display_lines(&catalog.list_devices().unwrap());

        assert_eq!(
            lines,
            vec![
                "Device 1: QEMU HARDDISK: MBR",
                "Device 2: Kingston: Unknown",
                "Device -1: Legacy: Unknown",
            ]
        );
    }
}
