/*++

Licensed under the Apache-2.0 license.

File Name:

    memory.rs

Abstract:

    File contains the physical-memory map interface.

--*/

use switchboot_error::SwitchbootResult;

/// Bounds-checked access to the physical address space the loader places
/// images into (warmboot, secure monitor, rebuilt package2, BootConfig).
pub trait MemoryMap {
    /// Copy `data` to physical address `addr`.
    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> SwitchbootResult<()>;

    /// Read `buf.len()` bytes from physical address `addr`.
    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> SwitchbootResult<()>;

    /// Fill `len` bytes at `addr` with `value`.
    fn fill(&mut self, addr: u32, len: usize, value: u8) -> SwitchbootResult<()>;

    /// Write one 32-bit little-endian word at `addr`.
    fn write_u32(&mut self, addr: u32, value: u32) -> SwitchbootResult<()> {
        self.write_bytes(addr, &value.to_le_bytes())
    }

    /// Read one 32-bit little-endian word at `addr`.
    fn read_u32(&mut self, addr: u32) -> SwitchbootResult<u32> {
        let mut word = [0u8; 4];
        self.read_bytes(addr, &mut word)?;
        Ok(u32::from_le_bytes(word))
    }
}
