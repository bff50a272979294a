/*++

Licensed under the Apache-2.0 license.

File Name:

    fwgen.rs

Abstract:

    File contains the encrypted firmware-image generator. It mirrors the
    derivation math so the images it produces decrypt correctly under a
    freshly derived key bank.

--*/

use aes::Aes128;
use anyhow::{bail, Context, Result};
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};

use crate::{RamStorage, SparseRam};
use switchboot_drivers::memory_layout::{
    KEYBLOB_STORAGE_OFFSET, PKG1_SIZE, PKG1_STORAGE_OFFSET, PKG2_PARTITION_NAME,
    PKG2_PARTITION_SUBOFFSET,
};
use switchboot_drivers::{KeySlotEngine, MemoryMap, SecurityEngine, BLOCK_SIZE};
use switchboot_image::seeds;
use switchboot_image::{
    build_encrypt, identify, key_slot_for_version, FirmwareVersionId, Kip1Header, Kip1Section,
    KipDirectory, Pk11Header, KEYBLOB_SIZE, KIP1_MAGIC, PK11_MAGIC, PKG1_BUILD_TAG_OFFSET,
    PKG2_SEC_CTR_SIZE,
};
use zerocopy::AsBytes;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

fn ecb_encrypt(key: &[u8; 16], block: &[u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut out = GenericArray::clone_from_slice(block);
    cipher.encrypt_block(&mut out);
    out.into()
}

fn ecb_decrypt(key: &[u8; 16], block: &[u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut out = GenericArray::clone_from_slice(block);
    cipher.decrypt_block(&mut out);
    out.into()
}

fn ctr_apply(key: &[u8; 16], iv: &[u8; 16], buf: &mut [u8]) {
    let mut cipher = Aes128Ctr::new(key.into(), iv.into());
    cipher.apply_keystream(buf);
}

/// Root secrets of a generated device, plus the key material the keyblob
/// payload carries.
#[derive(Clone, Copy)]
pub struct FwKeys {
    pub tsec_secret: [u8; 16],
    pub sbk: [u8; 16],
    pub master_intermediate: [u8; 16],
    pub pkg1_key: [u8; 16],
}

impl FwKeys {
    /// Deterministic key set for tests.
    pub fn sample() -> Self {
        Self {
            tsec_secret: [0x11; 16],
            sbk: [0x22; 16],
            master_intermediate: [0x33; 16],
            pkg1_key: [0x44; 16],
        }
    }

    /// Keyblob-unwrapping key for a firmware version: the version seed
    /// encrypted under the co-processor secret, then unwrapped under the
    /// fused secure boot key.
    pub fn keyblob_key(&self, version: FirmwareVersionId) -> [u8; 16] {
        let seed = seeds::KEYBLOB_KEY_SEEDS[version.keyblob_index()];
        ecb_decrypt(&self.sbk, &ecb_encrypt(&self.tsec_secret, &seed))
    }

    /// Master key: the retail master seed unwrapped under the intermediate
    /// key carried in the keyblob payload.
    pub fn master_key(&self) -> [u8; 16] {
        ecb_decrypt(&self.master_intermediate, &seeds::MASTER_KEY_SEED_RETAIL)
    }

    /// Package2 key: the package2 seed unwrapped under the master key.
    pub fn pkg2_key(&self) -> [u8; 16] {
        ecb_decrypt(&self.master_key(), &seeds::PKG2_KEY_SEED)
    }
}

/// Build an encrypted keyblob record for a firmware version.
pub fn build_keyblob(keys: &FwKeys, version: FirmwareVersionId) -> [u8; KEYBLOB_SIZE] {
    let mut record = [0u8; KEYBLOB_SIZE];
    let iv = [0x99u8; 16];
    record[0x10..0x20].copy_from_slice(&iv);

    let mut payload = [0u8; 0x90];
    payload[0x00..0x10].copy_from_slice(&keys.master_intermediate);
    payload[0x80..0x90].copy_from_slice(&keys.pkg1_key);
    ctr_apply(&keys.keyblob_key(version), &iv, &mut payload);
    record[0x20..0xB0].copy_from_slice(&payload);
    record
}

/// Build an encrypted package1 blob around a known build tag.
///
/// The blob carries the co-processor firmware in plaintext at the
/// descriptor's offset and the PK11 sub-container (warmboot + secure
/// monitor) encrypted under the package1 key.
pub fn build_pkg1(
    keys: &FwKeys,
    build_tag: &str,
    tsec_fw: &[u8],
    warmboot: &[u8],
    secmon: &[u8],
) -> Result<Vec<u8>> {
    let mut pkg1 = vec![0u8; PKG1_SIZE];
    pkg1[PKG1_BUILD_TAG_OFFSET..PKG1_BUILD_TAG_OFFSET + build_tag.len()]
        .copy_from_slice(build_tag.as_bytes());
    let desc = identify(&pkg1)
        .ok()
        .context("build tag not in the version table")?;

    pkg1[desc.tsec_offset..desc.tsec_offset + tsec_fw.len()].copy_from_slice(tsec_fw);

    let hdr = Pk11Header {
        magic: PK11_MAGIC,
        warmboot_size: warmboot.len() as u32,
        secmon_size: secmon.len() as u32,
        pad: 0,
    };
    let iv = [0x77u8; 16];
    let body_start = desc.pk11_offset + 0x10;
    let body_len = core::mem::size_of::<Pk11Header>() + warmboot.len() + secmon.len();
    if body_start + body_len > pkg1.len() {
        bail!("pk11 payload does not fit the package1 blob");
    }

    pkg1[desc.pk11_offset..body_start].copy_from_slice(&iv);
    let mut body = Vec::with_capacity(body_len);
    body.extend_from_slice(hdr.as_bytes());
    body.extend_from_slice(warmboot);
    body.extend_from_slice(secmon);
    ctr_apply(&keys.pkg1_key, &iv, &mut body);
    pkg1[body_start..body_start + body_len].copy_from_slice(&body);
    Ok(pkg1)
}

/// KIP1 record with a single data section, for directory tests.
pub fn make_kip(name: &str, payload: &[u8]) -> Vec<u8> {
    let mut hdr = Kip1Header {
        magic: KIP1_MAGIC,
        name: [0; 12],
        tid: 0x0100_0000_0000_1000,
        process_category: 0,
        main_thread_priority: 44,
        default_cpu_core: 0,
        reserved: 0,
        flags: 0,
        sections: [Kip1Section::default(); 6],
        capabilities: [0; 0x20],
    };
    hdr.name[..name.len()].copy_from_slice(name.as_bytes());
    hdr.sections[0].dst_size = payload.len() as u32;
    hdr.sections[0].compressed_size = payload.len() as u32;
    let mut record = hdr.as_bytes().to_vec();
    record.extend_from_slice(payload);
    record
}

/// Build an encrypted package2 container from a kernel and a set of KIP1
/// records.
pub fn build_pkg2(
    keys: &FwKeys,
    version: FirmwareVersionId,
    kernel: &[u8],
    kips: &[Vec<u8>],
) -> Result<Vec<u8>> {
    let mut directory = KipDirectory::default();
    for kip in kips {
        directory.merge(kip).ok().context("malformed kip1 record")?;
    }

    let mut se = SecurityEngine::new();
    se.set_key(key_slot_for_version(version), &keys.pkg2_key())
        .ok()
        .context("key slot load failed")?;

    // One ctr per section, all distinct.
    let mut sec_ctr = [0u8; PKG2_SEC_CTR_SIZE];
    for (i, ctr) in sec_ctr.chunks_exact_mut(16).enumerate() {
        ctr.fill(0xC0 + i as u8);
    }

    let mut ram = SparseRam::new();
    let total = build_encrypt(&mut se, &mut ram, version, 0, kernel, &directory, &sec_ctr)
        .ok()
        .context("package2 build failed")?;

    let mut container = vec![0u8; total as usize];
    ram.read_bytes(0, &mut container)
        .ok()
        .context("package2 readback failed")?;
    Ok(container)
}

/// Everything needed to synthesize a bootable storage medium.
pub struct FwImageBuilder {
    pub keys: FwKeys,
    pub build_tag: String,
    pub tsec_fw: Vec<u8>,
    pub warmboot: Vec<u8>,
    pub secmon: Vec<u8>,
    pub kernel: Vec<u8>,
    pub kips: Vec<Vec<u8>>,
}

/// First block of the package2 partition on generated media.
pub const PKG2_PARTITION_START_BLOCK: u64 = 0x1000;

impl FwImageBuilder {
    pub fn new(build_tag: &str) -> Self {
        Self {
            keys: FwKeys::sample(),
            build_tag: build_tag.to_string(),
            tsec_fw: vec![0xF1; 0x100],
            warmboot: vec![0xB0; 0x400],
            secmon: vec![0xB1; 0x800],
            kernel: vec![0xB2; 0x1000],
            kips: Vec::new(),
        }
    }

    /// Write package1, the keyblob and the package2 partition onto a fresh
    /// medium.
    pub fn build(&self) -> Result<RamStorage> {
        let version = {
            let mut probe = vec![0u8; 0x40];
            probe[PKG1_BUILD_TAG_OFFSET..PKG1_BUILD_TAG_OFFSET + self.build_tag.len()]
                .copy_from_slice(self.build_tag.as_bytes());
            identify(&probe)
                .ok()
                .context("build tag not in the version table")?
                .version
        };

        let pkg1 = build_pkg1(
            &self.keys,
            &self.build_tag,
            &self.tsec_fw,
            &self.warmboot,
            &self.secmon,
        )?;
        let keyblob = build_keyblob(&self.keys, version);
        let pkg2 = build_pkg2(&self.keys, version, &self.kernel, &self.kips)?;

        let pkg2_offset = PKG2_PARTITION_START_BLOCK * BLOCK_SIZE as u64 + PKG2_PARTITION_SUBOFFSET;
        let total_bytes = pkg2_offset + pkg2.len() as u64 + BLOCK_SIZE as u64;
        let block_count = (total_bytes + BLOCK_SIZE as u64 - 1) / BLOCK_SIZE as u64;

        let mut storage = RamStorage::new(block_count);
        storage.write_at(PKG1_STORAGE_OFFSET, &pkg1);
        storage.write_at(
            KEYBLOB_STORAGE_OFFSET + version.keyblob_index() as u64 * BLOCK_SIZE as u64,
            &keyblob,
        );
        storage.add_partition(
            PKG2_PARTITION_NAME,
            PKG2_PARTITION_START_BLOCK,
            block_count - PKG2_PARTITION_START_BLOCK,
        );
        storage.write_at(pkg2_offset, &pkg2);
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboot_drivers::KeySlot;
    use switchboot_image::{decrypt, Keyblob};

    #[test]
    fn test_keyblob_decrypts_under_derived_key() {
        let keys = FwKeys::sample();
        let record = build_keyblob(&keys, FirmwareVersionId::Fw500);
        let kb = Keyblob::read(&record).unwrap();

        let mut payload = kb.payload;
        ctr_apply(
            &keys.keyblob_key(FirmwareVersionId::Fw500),
            &kb.iv,
            &mut payload,
        );
        assert_eq!(&payload[0x00..0x10], &keys.master_intermediate);
        assert_eq!(&payload[0x80..0x90], &keys.pkg1_key);
    }

    #[test]
    fn test_pkg2_decrypts_under_derived_key() {
        let keys = FwKeys::sample();
        let kernel = vec![0xAB; 0x200];
        let kips = vec![make_kip("sm", b"svc")];
        let mut container =
            build_pkg2(&keys, FirmwareVersionId::Fw500, &kernel, &kips).unwrap();

        let mut se = SecurityEngine::new();
        se.set_key(KeySlot::Slot8, &keys.pkg2_key()).unwrap();
        let view = decrypt(&mut se, FirmwareVersionId::Fw500, &mut container).unwrap();
        assert_eq!(&container[view.kernel_range()], &kernel[..]);
        let dir = KipDirectory::parse(&container[view.ini1_range()]).unwrap();
        assert_eq!(dir.len(), 1);
        assert!(dir.get("sm").is_some());
    }

    // If two sections shared a keystream, XORing their ciphertexts would
    // yield the XOR of the plaintexts.
    #[test]
    fn test_sections_use_distinct_keystreams() {
        let keys = FwKeys::sample();
        let kernel = vec![0u8; 0x80];
        let kip = make_kip("sm", b"svc");
        let container =
            build_pkg2(&keys, FirmwareVersionId::Fw500, &kernel, &[kip.clone()]).unwrap();

        let mut directory = KipDirectory::default();
        directory.merge(&kip).unwrap();
        let ini1_pt = directory.serialize();

        let body = 0x200;
        let kernel_ct = &container[body..body + kernel.len()];
        let ini1_ct = &container[body + kernel.len()..body + kernel.len() + ini1_pt.len()];
        let n = kernel.len().min(ini1_pt.len());
        let ct_xor: Vec<u8> = kernel_ct[..n]
            .iter()
            .zip(&ini1_ct[..n])
            .map(|(a, b)| a ^ b)
            .collect();
        let pt_xor: Vec<u8> = kernel[..n]
            .iter()
            .zip(&ini1_pt[..n])
            .map(|(a, b)| a ^ b)
            .collect();
        assert_ne!(ct_xor, pt_xor);
    }

    // Decrypt then rebuild with an unchanged kernel and directory must
    // reproduce the original ciphertext byte for byte.
    #[test]
    fn test_pkg2_rebuild_reproduces_ciphertext() {
        let keys = FwKeys::sample();
        let kernel = vec![0x5A; 0x300];
        let kips = vec![make_kip("sm", b"svc"), make_kip("boot", b"bb")];
        let original =
            build_pkg2(&keys, FirmwareVersionId::Fw400, &kernel, &kips).unwrap();

        let mut container = original.clone();
        let mut se = SecurityEngine::new();
        se.set_key(KeySlot::Slot8, &keys.pkg2_key()).unwrap();
        let view = decrypt(&mut se, FirmwareVersionId::Fw400, &mut container).unwrap();
        let kernel_copy = container[view.kernel_range()].to_vec();
        let dir = KipDirectory::parse(&container[view.ini1_range()]).unwrap();
        assert_ne!(view.header.sec_ctr[0..16], view.header.sec_ctr[16..32]);

        let mut ram = SparseRam::new();
        let total = build_encrypt(
            &mut se,
            &mut ram,
            FirmwareVersionId::Fw400,
            0,
            &kernel_copy,
            &dir,
            &view.header.sec_ctr,
        )
        .unwrap();
        let mut rebuilt = vec![0u8; total as usize];
        ram.read_bytes(0, &mut rebuilt).unwrap();
        assert_eq!(rebuilt, original);
    }
}
