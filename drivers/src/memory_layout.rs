/*++

Licensed under the Apache-2.0 license.

File Name:

    memory_layout.rs

Abstract:

    File contains the fixed physical addresses and storage offsets consumed
    by the boot flows.

--*/

/// Package1 blob byte offset on the boot partition
pub const PKG1_STORAGE_OFFSET: u64 = 0x10_0000;

/// Package1 blob size
pub const PKG1_SIZE: usize = 0x4_0000;

/// Keyblob records base byte offset; record `n` lives one block further per
/// firmware-version index
pub const KEYBLOB_STORAGE_OFFSET: u64 = 0x18_0000;

/// Package2 partition name in the partition directory
pub const PKG2_PARTITION_NAME: &str = "BCPKG2-1-Normal-Main";

/// Package2 container sub-offset within its partition
pub const PKG2_PARTITION_SUBOFFSET: u64 = 0x4000;

/// Physical address the rebuilt package2 is handed to the secure monitor at
pub const PKG2_LOAD_ADDR: u32 = 0xA980_0000;

/// Warmboot firmware address consumed by the PMC on wake
pub const WARMBOOT_ADDR: u32 = 0x8000_D000;

/// BootConfig region cleared before the handshake
pub const BOOTCFG_ADDR: u32 = 0x4003_D000;

/// BootConfig region size
pub const BOOTCFG_SIZE: usize = 0x3000;

/// Inbound doorbell word (command to the secure monitor)
pub const MAILBOX_IN_ADDR: u32 = 0x4000_2EF8;

/// Outbound doorbell word (readiness from the secure monitor)
pub const MAILBOX_OUT_ADDR: u32 = 0x4000_2EFC;
