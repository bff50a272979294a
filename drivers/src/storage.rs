/*++

Licensed under the Apache-2.0 license.

File Name:

    storage.rs

Abstract:

    File contains the block-storage interface and partition types.

--*/

use switchboot_error::SwitchbootResult;

/// Storage block size in bytes (external constant of the medium).
pub const BLOCK_SIZE: usize = 512;

/// One entry of the medium's partition directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub name: String,
    pub start_block: u64,
    pub block_count: u64,
}

/// Block-addressed storage over a multi-partition medium.
pub trait BlockStorage {
    /// Read `block_count` blocks starting at absolute block `start_block`
    /// into `buf`. `buf` must be exactly `block_count * BLOCK_SIZE` bytes.
    fn read_blocks(
        &mut self,
        start_block: u64,
        block_count: u64,
        buf: &mut [u8],
    ) -> SwitchbootResult<()>;

    /// Look up a partition by exact name.
    fn find_partition(&mut self, name: &str) -> SwitchbootResult<Option<Partition>>;
}

/// Read `len` bytes (rounded up to whole blocks by the caller) from a byte
/// offset that is block aligned.
pub fn read_at<S: BlockStorage + ?Sized>(
    storage: &mut S,
    byte_offset: u64,
    buf: &mut [u8],
) -> SwitchbootResult<()> {
    debug_assert_eq!(byte_offset % BLOCK_SIZE as u64, 0);
    debug_assert_eq!(buf.len() % BLOCK_SIZE, 0);
    storage.read_blocks(
        byte_offset / BLOCK_SIZE as u64,
        (buf.len() / BLOCK_SIZE) as u64,
        buf,
    )
}
