/*++

Licensed under the Apache-2.0 license.

File Name:

    pmc.rs

Abstract:

    File contains the PMC scratch interface used for the warmboot pointer.

--*/

/// Power-management-controller scratch registers the loader publishes the
/// warmboot firmware address through. Full PMC programming is the platform
/// layer's concern; the boot flow only records the wake entry point.
pub trait Pmc {
    /// Record the physical address of the warmboot firmware.
    fn set_warmboot_entry(&mut self, addr: u32);
}
