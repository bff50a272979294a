/*++

Licensed under the Apache-2.0 license.

File Name:

    pkg2.rs

Abstract:

    File contains the package2 container layout, decrypt and rebuild.

--*/

use zerocopy::{AsBytes, FromBytes};

use crate::kip::KipDirectory;
use crate::version::FirmwareVersionId;
use switchboot_drivers::{KeySlot, KeySlotEngine, MemoryMap, AES_BLOCK_SIZE};
use switchboot_error::{SwitchbootError, SwitchbootResult};

/// Package2 magic ("PK21")
pub const PKG2_MAGIC: u32 = 0x3132_4B50;

/// Signature area preceding the header
pub const PKG2_SIG_SIZE: usize = 0x100;

/// Header size
pub const PKG2_HDR_SIZE: usize = 0x100;

/// Number of sections
pub const PKG2_SEC_COUNT: usize = 4;

/// Kernel section index
pub const PKG2_SEC_KERNEL: usize = 0;

/// INI1 directory section index
pub const PKG2_SEC_INI1: usize = 1;

/// Virtual base address recorded in the header
pub const PKG2_BASE: u32 = 0x1000_0000;

/// Virtual address of the INI1 section recorded in the header
pub const PKG2_INI1_BASE: u32 = 0x1408_0000;

/// Container byte offsets of the three size-obfuscation words
/// (ctr words 0, 2 and 3; they XOR to the true container size)
pub const PKG2_SIZE_XOR_WORDS: [usize; 3] = [0x100, 0x108, 0x10C];

/// Size of the per-section ctr array in the header
pub const PKG2_SEC_CTR_SIZE: usize = PKG2_SEC_COUNT * AES_BLOCK_SIZE;

/// Package2 header. The leading ctr field is stored in plaintext (it doubles
/// as the size obfuscation); everything after it is AES-CTR encrypted.
#[repr(C)]
#[derive(AsBytes, FromBytes, Debug, Clone, Copy)]
pub struct Pkg2Header {
    pub ctr: [u8; 0x10],
    pub sec_ctr: [u8; PKG2_SEC_CTR_SIZE],
    pub magic: u32,
    pub base: u32,
    pub pad0: u32,
    pub version: u16,
    pub pad1: u16,
    pub sec_size: [u32; PKG2_SEC_COUNT],
    pub sec_off: [u32; PKG2_SEC_COUNT],
    pub sec_sha256: [u8; 0x80],
}

impl Default for Pkg2Header {
    fn default() -> Self {
        Self {
            ctr: [0; 0x10],
            sec_ctr: [0; PKG2_SEC_CTR_SIZE],
            magic: 0,
            base: 0,
            pad0: 0,
            version: 0,
            pad1: 0,
            sec_size: [0; PKG2_SEC_COUNT],
            sec_off: [0; PKG2_SEC_COUNT],
            sec_sha256: [0; 0x80],
        }
    }
}

impl Pkg2Header {
    fn section_ctr(&self, index: usize) -> [u8; AES_BLOCK_SIZE] {
        self.sec_ctr[index * AES_BLOCK_SIZE..(index + 1) * AES_BLOCK_SIZE]
            .try_into()
            .unwrap()
    }
}

/// Decrypted package2: parsed header plus the section extents within the
/// backing buffer.
pub struct Pkg2View {
    pub header: Pkg2Header,
    sections: [(usize, usize); PKG2_SEC_COUNT],
}

impl Pkg2View {
    /// Byte range of a section within the container buffer.
    pub fn section_range(&self, index: usize) -> core::ops::Range<usize> {
        let (start, len) = self.sections[index];
        start..start + len
    }

    pub fn kernel_range(&self) -> core::ops::Range<usize> {
        self.section_range(PKG2_SEC_KERNEL)
    }

    pub fn ini1_range(&self) -> core::ops::Range<usize> {
        self.section_range(PKG2_SEC_INI1)
    }
}

/// Key slot holding the package2 key for the given firmware version.
///
/// Every known version routes through the same slot; the derivation chain
/// already left the version-specific key there.
pub fn key_slot_for_version(_version: FirmwareVersionId) -> KeySlot {
    KeySlot::Slot8
}

/// Recover the true container size from the obfuscated header words.
///
/// This is obfuscation, not a checksum: corrupting any one word yields a
/// wrong size with no way to detect it here.
pub fn recover_size(container: &[u8]) -> SwitchbootResult<u32> {
    let mut size = 0u32;
    for off in PKG2_SIZE_XOR_WORDS {
        let word = container
            .get(off..off + 4)
            .ok_or(SwitchbootError::PKG2_TRUNCATED)?;
        size ^= u32::from_le_bytes(word.try_into().unwrap());
    }
    Ok(size)
}

/// Decrypt the container in place and parse its section layout.
pub fn decrypt(
    se: &mut dyn KeySlotEngine,
    version: FirmwareVersionId,
    container: &mut [u8],
) -> SwitchbootResult<Pkg2View> {
    let slot = key_slot_for_version(version);
    let hdr_start = PKG2_SIG_SIZE;
    let body_start = hdr_start + PKG2_HDR_SIZE;
    if container.len() < body_start {
        return Err(SwitchbootError::PKG2_TRUNCATED);
    }

    // The ctr field stays in plaintext; the rest of the header is encrypted
    // with it as the IV.
    let iv: [u8; AES_BLOCK_SIZE] = container[hdr_start..hdr_start + AES_BLOCK_SIZE]
        .try_into()
        .unwrap();
    se.crypt_ctr(slot, &iv, &mut container[hdr_start + AES_BLOCK_SIZE..body_start])?;

    let header = Pkg2Header::read_from_prefix(&container[hdr_start..])
        .ok_or(SwitchbootError::PKG2_TRUNCATED)?;
    if header.magic != PKG2_MAGIC {
        return Err(SwitchbootError::PKG2_BAD_MAGIC);
    }

    let mut sections = [(0usize, 0usize); PKG2_SEC_COUNT];
    let mut cursor = body_start;
    for i in 0..PKG2_SEC_COUNT {
        let len = header.sec_size[i] as usize;
        let end = cursor
            .checked_add(len)
            .ok_or(SwitchbootError::PKG2_TRUNCATED)?;
        if end > container.len() {
            return Err(SwitchbootError::PKG2_TRUNCATED);
        }
        if len != 0 {
            let sec_iv = header.section_ctr(i);
            se.crypt_ctr(slot, &sec_iv, &mut container[cursor..end])?;
        }
        sections[i] = (cursor, len);
        cursor = end;
    }

    Ok(Pkg2View { header, sections })
}

/// Re-serialize kernel + directory into a fresh container, encrypt it with
/// the same key used for decryption and write it to the physical launch
/// address.
///
/// `sec_ctr` supplies the per-section IVs; the sections must not share a
/// keystream, so a rebuild carries the decrypted container's own section
/// ctrs through.
///
/// # Returns
///
/// * Total container size in bytes
pub fn build_encrypt(
    se: &mut dyn KeySlotEngine,
    mem: &mut dyn MemoryMap,
    version: FirmwareVersionId,
    target_addr: u32,
    kernel: &[u8],
    directory: &KipDirectory,
    sec_ctr: &[u8; PKG2_SEC_CTR_SIZE],
) -> SwitchbootResult<u32> {
    let slot = key_slot_for_version(version);
    let ini1 = directory.serialize();
    let total = PKG2_SIG_SIZE + PKG2_HDR_SIZE + kernel.len() + ini1.len();

    let mut header = Pkg2Header {
        magic: PKG2_MAGIC,
        base: PKG2_BASE,
        sec_ctr: *sec_ctr,
        ..Default::default()
    };
    // ctr words 0, 2 and 3 must XOR to the container size; words 1-3 stay
    // zero so word 0 carries it.
    header.ctr[0..4].copy_from_slice(&(total as u32).to_le_bytes());
    header.sec_size[PKG2_SEC_KERNEL] = kernel.len() as u32;
    header.sec_size[PKG2_SEC_INI1] = ini1.len() as u32;
    header.sec_off[PKG2_SEC_KERNEL] = PKG2_BASE;
    header.sec_off[PKG2_SEC_INI1] = PKG2_INI1_BASE;

    let mut container = vec![0u8; total];
    let hdr_start = PKG2_SIG_SIZE;
    let body_start = hdr_start + PKG2_HDR_SIZE;
    container[hdr_start..body_start].copy_from_slice(header.as_bytes());
    container[body_start..body_start + kernel.len()].copy_from_slice(kernel);
    container[body_start + kernel.len()..].copy_from_slice(&ini1);

    let iv: [u8; AES_BLOCK_SIZE] = header.ctr;
    se.crypt_ctr(slot, &iv, &mut container[hdr_start + AES_BLOCK_SIZE..body_start])?;

    let mut cursor = body_start;
    for i in 0..PKG2_SEC_COUNT {
        let len = header.sec_size[i] as usize;
        if len != 0 {
            let sec_iv = header.section_ctr(i);
            se.crypt_ctr(slot, &sec_iv, &mut container[cursor..cursor + len])?;
        }
        cursor += len;
    }

    mem.write_bytes(target_addr, &container)?;
    Ok(total as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        assert_eq!(core::mem::size_of::<Pkg2Header>(), PKG2_HDR_SIZE);
    }

    #[test]
    fn test_recover_size_xor() {
        let mut container = vec![0u8; 0x200];
        container[0x100..0x104].copy_from_slice(&0xAAAA_0000u32.to_le_bytes());
        container[0x108..0x10C].copy_from_slice(&0x0000_5555u32.to_le_bytes());
        container[0x10C..0x110].copy_from_slice(&0x0F0F_0F0Fu32.to_le_bytes());
        assert_eq!(
            recover_size(&container).unwrap(),
            0xAAAA_0000 ^ 0x0000_5555 ^ 0x0F0F_0F0F
        );
    }

    #[test]
    fn test_recover_size_corruption_changes_result() {
        let mut container = vec![0u8; 0x200];
        container[0x100..0x104].copy_from_slice(&0x1234u32.to_le_bytes());
        let good = recover_size(&container).unwrap();
        container[0x108] ^= 0x01;
        let bad = recover_size(&container).unwrap();
        assert_ne!(good, bad);
        assert_eq!(bad, good ^ 0x01);
    }

    #[test]
    fn test_recover_size_short_buffer() {
        assert_eq!(
            recover_size(&[0u8; 0x100]).err(),
            Some(SwitchbootError::PKG2_TRUNCATED)
        );
    }
}
