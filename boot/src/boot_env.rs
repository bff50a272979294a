/*++

Licensed under the Apache-2.0 license.

File Name:

    boot_env.rs

Abstract:

    File contains the hardware context handed to the boot flow.

--*/

use switchboot_drivers::{
    BlockStorage, ClusterControl, ConfigSource, Console, Coprocessor, Doorbell, FileStore,
    FuseBank, KeySlotEngine, MemoryMap, Pmc,
};

/// Every piece of hardware the boot flow touches, owned in one place.
///
/// There is no ambient hardware state anywhere below this; each stage
/// receives the parts of the environment it needs and nothing else.
pub struct BootEnv {
    /// Security-engine key-slot bank
    pub se: Box<dyn KeySlotEngine>,

    /// TSEC co-processor
    pub tsec: Box<dyn Coprocessor>,

    /// Fuse bank holding the secure boot key
    pub fuse: FuseBank,

    /// Boot medium
    pub storage: Box<dyn BlockStorage>,

    /// File store for override images
    pub files: Box<dyn FileStore>,

    /// Physical address space
    pub mem: Box<dyn MemoryMap>,

    /// Secondary execution context
    pub cluster: Box<dyn ClusterControl>,

    /// Handshake doorbell pair
    pub doorbell: Box<dyn Doorbell>,

    /// Power management controller scratch space
    pub pmc: Box<dyn Pmc>,

    /// Status console
    pub console: Box<dyn Console>,

    /// Profile resolver
    pub config: Box<dyn ConfigSource>,
}
