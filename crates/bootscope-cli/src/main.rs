//! Bootscope CLI - boot sector inspection tool
//!
//! Lists storage devices with their partitioning scheme and prints the MBR
//! partition table of a chosen device or image file.

use anyhow::{Context, Result};
use bootscope_core::{format_size, DeviceDescriptor};
use bootscope_devices::{display_lines, read_boot_sector, DeviceCatalog, DeviceConfig};
use bootscope_zones::mbr::{self, BootSectorReport, PartitionEntry};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bootscope")]
#[command(about = "Inspect MBR partition tables of disks and disk images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// sysfs mount point
    #[arg(long, env = "BOOTSCOPE_SYSFS", default_value = "/sys", global = true)]
    sysfs_root: PathBuf,

    /// Device node directory
    #[arg(long, env = "BOOTSCOPE_DEV", default_value = "/dev", global = true)]
    dev_root: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// List storage devices
    Devices {
        /// Show model, size and partition count of each device
        #[arg(long, short)]
        verbose: bool,

        /// Include loop, RAM and device-mapper devices
        #[arg(long)]
        all: bool,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode the partition table of a device or image
    Inspect {
        /// Device index from `devices`, or a device/image path
        target: String,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

/// What `inspect` was pointed at
#[derive(Debug, PartialEq, Eq)]
enum Target {
    /// A device index as printed by `devices`, `-1` included
    Index(i64),
    /// A device node or image file
    Path(String),
}

impl Target {
    fn parse(raw: &str) -> Self {
        match raw.parse() {
            Ok(index) => Target::Index(index),
            Err(_) => Target::Path(raw.to_string()),
        }
    }
}

/// Flattened partition entry for JSON output
#[derive(Serialize)]
struct PartitionSummary {
    partition: usize,
    boot_flag: String,
    bootable: bool,
    start_chs: String,
    end_chs: String,
    partition_type: String,
    type_label: &'static str,
    start_lba: u32,
    sector_count: u32,
    size_mb: u64,
}

impl From<&PartitionEntry> for PartitionSummary {
    fn from(entry: &PartitionEntry) -> Self {
        Self {
            partition: entry.slot + 1,
            boot_flag: format!("{:#x}", entry.boot_flag),
            bootable: entry.is_bootable(),
            start_chs: entry.start_chs_hex(),
            end_chs: entry.end_chs_hex(),
            partition_type: format!("{:#x}", entry.partition_type),
            type_label: entry.type_label(),
            start_lba: entry.start_lba,
            sector_count: entry.sector_count,
            size_mb: entry.size_mb(),
        }
    }
}

#[derive(Serialize)]
struct InspectOutput<'a> {
    device_id: &'a str,
    boot_signature: String,
    signature_valid: bool,
    disk_signature: String,
    partitions: Vec<PartitionSummary>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = DeviceConfig {
        sysfs_root: cli.sysfs_root,
        dev_root: cli.dev_root,
        include_virtual: false,
    };

    match cli.command {
        Command::Devices { verbose, all, json } => cmd_devices(
            DeviceConfig {
                include_virtual: all,
                ..config
            },
            verbose,
            json,
        ),
        Command::Inspect { target, json } => cmd_inspect(config, &target, json),
    }
}

fn cmd_devices(config: DeviceConfig, verbose: bool, json: bool) -> Result<()> {
    let catalog = DeviceCatalog::from_config(config);
    let devices = catalog
        .list_devices()
        .context("Failed to enumerate devices")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!("No devices found.");
        return Ok(());
    }

    if verbose {
        for dev in &devices {
            print_device_details(dev);
        }
    } else {
        for line in display_lines(&devices) {
            println!("{}", line);
        }
    }

    Ok(())
}

fn print_device_details(dev: &DeviceDescriptor) {
    println!("Device ID: {}", dev.id);
    println!("Index: {}", dev.display_index());
    println!("Model: {}", dev.display_name);
    println!("Size (GB): {} ({})", dev.size_gb(), format_size(dev.size_bytes));
    println!("Partitions: {}", dev.partition_count);
    println!("Partition Style: {}", dev.partitioning_scheme);
    if !dev.is_selectable() {
        println!("Note: no numeric index, select this device by path instead");
    }
    println!("{}", "-".repeat(40));
}

fn cmd_inspect(config: DeviceConfig, target: &str, json: bool) -> Result<()> {
    let device_id = match Target::parse(target) {
        Target::Index(index) => {
            let device_id = DeviceCatalog::from_config(config).resolve(index)?;
            tracing::info!("Selected device {}: {}", index, device_id);
            device_id
        }
        Target::Path(path) => path,
    };

    let sector = read_boot_sector(&device_id)?;
    let report = mbr::inspect(&sector).context("Failed to parse partition table")?;

    if json {
        print_report_json(&device_id, &report)?;
    } else {
        print!("{}", render_report(&device_id, &report));
    }

    Ok(())
}

/// Human-readable report, all four slots in table order
fn render_report(device_id: &str, report: &BootSectorReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Partition Table ===");
    let _ = writeln!(out, "Device:      {}", device_id);
    let _ = writeln!(out, "Disk Sig:    0x{:08X}", report.disk_signature);
    let _ = writeln!(out, "Boot Sig:    0x{:04X}", report.boot_signature);
    if !report.signature_valid {
        let _ = writeln!(
            out,
            "Warning:     boot signature is not 0xAA55, table may be garbage"
        );
    }
    if report.is_gpt_protective() {
        let _ = writeln!(
            out,
            "Note:        protective MBR, this disk is partitioned with GPT"
        );
    }
    let _ = writeln!(out);

    for entry in &report.entries {
        let _ = writeln!(out, "{}", entry);
        if mbr::is_extended(entry.partition_type) {
            let _ = writeln!(out, "  (extended container, logical partitions not listed)");
        }
        let _ = writeln!(out);
    }

    out
}

fn print_report_json(device_id: &str, report: &BootSectorReport) -> Result<()> {
    let output = InspectOutput {
        device_id,
        boot_signature: format!("0x{:04X}", report.boot_signature),
        signature_valid: report.signature_valid,
        disk_signature: format!("0x{:08X}", report.disk_signature),
        partitions: report.entries.iter().map(PartitionSummary::from).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
