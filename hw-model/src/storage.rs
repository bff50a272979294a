/*++

Licensed under the Apache-2.0 license.

File Name:

    storage.rs

Abstract:

    File contains a RAM-backed block storage model with a partition
    directory.

--*/

use switchboot_drivers::{BlockStorage, Partition, BLOCK_SIZE};
use switchboot_error::{SwitchbootError, SwitchbootResult};

/// Block storage backed by a flat byte vector plus a partition directory.
pub struct RamStorage {
    bytes: Vec<u8>,
    partitions: Vec<Partition>,
}

impl RamStorage {
    /// Create a zero-filled medium of `block_count` blocks.
    pub fn new(block_count: u64) -> Self {
        Self {
            bytes: vec![0; block_count as usize * BLOCK_SIZE],
            partitions: Vec::new(),
        }
    }

    /// Register a partition directory entry.
    pub fn add_partition(&mut self, name: &str, start_block: u64, block_count: u64) {
        self.partitions.push(Partition {
            name: name.to_string(),
            start_block,
            block_count,
        });
    }

    /// Place `data` at an absolute byte offset on the medium.
    pub fn write_at(&mut self, byte_offset: u64, data: &[u8]) {
        let start = byte_offset as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
    }
}

impl BlockStorage for RamStorage {
    fn read_blocks(
        &mut self,
        start_block: u64,
        block_count: u64,
        buf: &mut [u8],
    ) -> SwitchbootResult<()> {
        if buf.len() != block_count as usize * BLOCK_SIZE {
            return Err(SwitchbootError::DRIVER_STORAGE_READ_FAILED);
        }
        let start = start_block as usize * BLOCK_SIZE;
        let end = start + buf.len();
        if end > self.bytes.len() {
            return Err(SwitchbootError::DRIVER_STORAGE_OUT_OF_RANGE);
        }
        buf.copy_from_slice(&self.bytes[start..end]);
        Ok(())
    }

    fn find_partition(&mut self, name: &str) -> SwitchbootResult<Option<Partition>> {
        Ok(self.partitions.iter().find(|p| p.name == name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_back_written_blocks() {
        let mut storage = RamStorage::new(8);
        storage.write_at(BLOCK_SIZE as u64, &[0xAB; BLOCK_SIZE]);
        let mut buf = [0u8; BLOCK_SIZE];
        storage.read_blocks(1, 1, &mut buf).unwrap();
        assert_eq!(buf, [0xAB; BLOCK_SIZE]);
    }

    #[test]
    fn test_out_of_range_read_rejected() {
        let mut storage = RamStorage::new(2);
        let mut buf = [0u8; BLOCK_SIZE];
        assert_eq!(
            storage.read_blocks(2, 1, &mut buf),
            Err(SwitchbootError::DRIVER_STORAGE_OUT_OF_RANGE)
        );
    }

    #[test]
    fn test_partition_lookup_is_exact() {
        let mut storage = RamStorage::new(2);
        storage.add_partition("BCPKG2-1-Normal-Main", 0, 2);
        assert!(storage
            .find_partition("BCPKG2-1-Normal-Main")
            .unwrap()
            .is_some());
        assert!(storage.find_partition("BCPKG2-1").unwrap().is_none());
    }
}
