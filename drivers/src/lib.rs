/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the hardware abstractions consumed by the boot flows.

--*/

mod cluster;
mod config;
mod console;
mod doorbell;
mod fuse;
mod memory;
pub mod memory_layout;
mod pmc;
mod se;
mod storage;
mod tsec;
mod vfs;

pub use cluster::ClusterControl;
pub use config::{ConfigEntry, ConfigSource};
pub use console::{Console, NullConsole, StatusLevel};
pub use doorbell::Doorbell;
pub use fuse::FuseBank;
pub use memory::MemoryMap;
pub use pmc::Pmc;
pub use se::{
    KeyAccess, KeySlot, KeySlotEngine, RsaSlot, SecurityEngine, AES_BLOCK_SIZE, AES_KEY_SIZE,
};
pub use storage::{read_at, BlockStorage, Partition, BLOCK_SIZE};
pub use tsec::{Coprocessor, TSEC_QUERY_KEYGEN};
pub use vfs::FileStore;

pub use switchboot_error::{SwitchbootError, SwitchbootResult};
