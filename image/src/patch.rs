/*++

Licensed under the Apache-2.0 license.

File Name:

    patch.rs

Abstract:

    File contains the patch-list types and application helpers.

--*/

use switchboot_drivers::MemoryMap;
use switchboot_error::{SwitchbootError, SwitchbootResult};

/// Sentinel offset terminating a static patch list.
pub const PATCH_SENTINEL: u32 = 0xFFFF_FFFF;

/// One patch: a 32-bit value written at base + offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchEntry {
    pub offset: u32,
    pub value: u32,
}

/// An ordered, sentinel-terminated patch list.
///
/// Application is total and in list order; there is no rollback on partial
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patchset {
    entries: &'static [PatchEntry],
}

impl Patchset {
    /// Wrap a static list. The list must end with the sentinel entry.
    pub const fn new(entries: &'static [PatchEntry]) -> Self {
        Self { entries }
    }

    /// Entries up to (excluding) the sentinel.
    pub fn entries(&self) -> &'static [PatchEntry] {
        let end = self
            .entries
            .iter()
            .position(|e| e.offset == PATCH_SENTINEL)
            .unwrap_or(self.entries.len());
        &self.entries[..end]
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Apply every entry at `base + offset` in physical memory.
    pub fn apply_to_memory(
        &self,
        mem: &mut dyn MemoryMap,
        base: u32,
    ) -> SwitchbootResult<()> {
        for entry in self.entries() {
            mem.write_u32(base.wrapping_add(entry.offset), entry.value)?;
        }
        Ok(())
    }
}

/// Apply a selection of entries to an in-memory image, in list order.
/// Application is total: every entry must land inside the image.
pub fn apply_entries_to_slice(entries: &[PatchEntry], image: &mut [u8]) -> SwitchbootResult<()> {
    for entry in entries {
        let off = entry.offset as usize;
        let end = off
            .checked_add(4)
            .ok_or(SwitchbootError::PKG2_PATCH_OUT_OF_RANGE)?;
        if end > image.len() {
            return Err(SwitchbootError::PKG2_PATCH_OUT_OF_RANGE);
        }
        image[off..end].copy_from_slice(&entry.value.to_le_bytes());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: PatchEntry = PatchEntry {
        offset: PATCH_SENTINEL,
        value: 0,
    };

    #[test]
    fn test_sentinel_only_list_is_empty() {
        static EMPTY: [PatchEntry; 1] = [SENTINEL];
        let set = Patchset::new(&EMPTY);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_entries_stop_at_sentinel() {
        static SET: [PatchEntry; 3] = [
            PatchEntry {
                offset: 0x10,
                value: 1,
            },
            PatchEntry {
                offset: 0x20,
                value: 2,
            },
            SENTINEL,
        ];
        let set = Patchset::new(&SET);
        assert_eq!(set.len(), 2);
        assert_eq!(set.entries()[1].offset, 0x20);
    }

    #[test]
    fn test_apply_to_slice_in_order() {
        let entries = [
            PatchEntry {
                offset: 0,
                value: 0x1111_1111,
            },
            PatchEntry {
                offset: 0,
                value: 0x2222_2222,
            },
        ];
        let mut image = [0u8; 8];
        apply_entries_to_slice(&entries, &mut image).unwrap();
        // Later entries win at the same offset.
        assert_eq!(&image[0..4], &0x2222_2222u32.to_le_bytes());
    }

    #[test]
    fn test_apply_to_slice_rejects_out_of_range_entry() {
        let entries = [
            PatchEntry {
                offset: 0,
                value: 0x1111_1111,
            },
            PatchEntry {
                offset: 0x10,
                value: 0x2222_2222,
            },
        ];
        let mut image = [0u8; 8];
        assert_eq!(
            apply_entries_to_slice(&entries, &mut image),
            Err(SwitchbootError::PKG2_PATCH_OUT_OF_RANGE)
        );
    }
}
