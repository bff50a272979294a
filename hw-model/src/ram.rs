/*++

Licensed under the Apache-2.0 license.

File Name:

    ram.rs

Abstract:

    File contains a sparse model of the physical address space.

--*/

use std::collections::BTreeMap;

use switchboot_drivers::MemoryMap;
use switchboot_error::{SwitchbootError, SwitchbootResult};

const PAGE_SIZE: u32 = 0x1000;

/// Sparse physical memory; pages materialize zero-filled on first touch.
#[derive(Default)]
pub struct SparseRam {
    pages: BTreeMap<u32, Box<[u8; PAGE_SIZE as usize]>>,
}

impl SparseRam {
    pub fn new() -> Self {
        Self::default()
    }

    fn page_mut(&mut self, page: u32) -> &mut [u8; PAGE_SIZE as usize] {
        self.pages
            .entry(page)
            .or_insert_with(|| Box::new([0; PAGE_SIZE as usize]))
    }

    fn check_range(addr: u32, len: usize) -> SwitchbootResult<()> {
        let len = u32::try_from(len).map_err(|_| SwitchbootError::DRIVER_MEMORY_OUT_OF_RANGE)?;
        addr.checked_add(len)
            .map(|_| ())
            .ok_or(SwitchbootError::DRIVER_MEMORY_OUT_OF_RANGE)
    }
}

impl MemoryMap for SparseRam {
    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> SwitchbootResult<()> {
        Self::check_range(addr, data.len())?;
        let mut addr = addr;
        let mut data = data;
        while !data.is_empty() {
            let page = addr / PAGE_SIZE;
            let off = (addr % PAGE_SIZE) as usize;
            let chunk = data.len().min(PAGE_SIZE as usize - off);
            self.page_mut(page)[off..off + chunk].copy_from_slice(&data[..chunk]);
            addr += chunk as u32;
            data = &data[chunk..];
        }
        Ok(())
    }

    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> SwitchbootResult<()> {
        Self::check_range(addr, buf.len())?;
        let mut addr = addr;
        let mut buf = buf;
        while !buf.is_empty() {
            let page = addr / PAGE_SIZE;
            let off = (addr % PAGE_SIZE) as usize;
            let chunk = buf.len().min(PAGE_SIZE as usize - off);
            match self.pages.get(&page) {
                Some(bytes) => buf[..chunk].copy_from_slice(&bytes[off..off + chunk]),
                None => buf[..chunk].fill(0),
            }
            addr += chunk as u32;
            buf = &mut buf[chunk..];
        }
        Ok(())
    }

    fn fill(&mut self, addr: u32, len: usize, value: u8) -> SwitchbootResult<()> {
        Self::check_range(addr, len)?;
        let mut addr = addr;
        let mut left = len;
        while left > 0 {
            let page = addr / PAGE_SIZE;
            let off = (addr % PAGE_SIZE) as usize;
            let chunk = left.min(PAGE_SIZE as usize - off);
            self.page_mut(page)[off..off + chunk].fill(value);
            addr += chunk as u32;
            left -= chunk;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_memory_reads_zero() {
        let mut ram = SparseRam::new();
        let mut buf = [0xFFu8; 8];
        ram.read_bytes(0xA980_0000, &mut buf).unwrap();
        assert_eq!(buf, [0; 8]);
    }

    #[test]
    fn test_write_across_page_boundary() {
        let mut ram = SparseRam::new();
        let data: Vec<u8> = (0..32).collect();
        ram.write_bytes(PAGE_SIZE - 16, &data).unwrap();
        let mut buf = [0u8; 32];
        ram.read_bytes(PAGE_SIZE - 16, &mut buf).unwrap();
        assert_eq!(buf[..], data[..]);
    }

    #[test]
    fn test_u32_round_trip() {
        let mut ram = SparseRam::new();
        ram.write_u32(0x4000_2EF8, 3).unwrap();
        assert_eq!(ram.read_u32(0x4000_2EF8).unwrap(), 3);
    }

    #[test]
    fn test_address_wrap_rejected() {
        let mut ram = SparseRam::new();
        assert_eq!(
            ram.write_bytes(u32::MAX - 2, &[0; 8]),
            Err(SwitchbootError::DRIVER_MEMORY_OUT_OF_RANGE)
        );
    }

    #[test]
    fn test_fill_clears_region() {
        let mut ram = SparseRam::new();
        ram.write_bytes(0x4003_D000, &[0xEE; 64]).unwrap();
        ram.fill(0x4003_D000, 64, 0).unwrap();
        let mut buf = [0xFFu8; 64];
        ram.read_bytes(0x4003_D000, &mut buf).unwrap();
        assert_eq!(buf, [0; 64]);
    }
}
