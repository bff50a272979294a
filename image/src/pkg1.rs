/*++

Licensed under the Apache-2.0 license.

File Name:

    pkg1.rs

Abstract:

    File contains the package1 version table, descriptor type and the PK11
    sub-container unpacker.

--*/

use zerocopy::{AsBytes, FromBytes};

use crate::patch::{PatchEntry, Patchset, PATCH_SENTINEL};
use crate::version::FirmwareVersionId;
use switchboot_drivers::{KeySlot, KeySlotEngine, AES_BLOCK_SIZE};
use switchboot_error::{SwitchbootError, SwitchbootResult};

/// Offset of the 14-character build tag inside the package1 blob
pub const PKG1_BUILD_TAG_OFFSET: usize = 0x10;

/// Build tag length
pub const PKG1_BUILD_TAG_LEN: usize = 14;

/// PK11 sub-container magic ("PK11")
pub const PK11_MAGIC: u32 = 0x3131_4B50;

/// Key slot the derivation chain leaves the package1 key in
pub const PKG1_KEY_SLOT: KeySlot = KeySlot::Slot11;

/// Static description of one known package1 version.
#[derive(Debug, Clone, Copy)]
pub struct Package1Descriptor {
    /// Build tag embedded in the blob
    pub build_tag: &'static str,

    /// Firmware version family (selects keyblob and key routing)
    pub version: FirmwareVersionId,

    /// Byte offset of the TSEC firmware within the blob
    pub tsec_offset: usize,

    /// Byte offset of the PK11 sub-container IV within the blob
    pub pk11_offset: usize,

    /// Secure monitor load address
    pub secmon_base: u32,

    /// Patches making the secure monitor accept a rebuilt package2
    pub secmon_patchset: Option<Patchset>,

    /// Kernel patches: entry 0 lifts syscall-permission verification,
    /// entry 1 enables debug mode
    pub kernel_patchset: Option<Patchset>,
}

const SENTINEL: PatchEntry = PatchEntry {
    offset: PATCH_SENTINEL,
    value: 0,
};

// AArch64 NOP.
const NOP: u32 = 0xD503_201F;
// AArch64 `mov w0, #1`.
const MOV_W0_1: u32 = 0x5280_0020;

static SECMON_PATCHES_100: [PatchEntry; 2] = [
    PatchEntry {
        offset: 0x9F0,
        value: NOP,
    },
    SENTINEL,
];

static SECMON_PATCHES_300: [PatchEntry; 2] = [
    PatchEntry {
        offset: 0xA24,
        value: NOP,
    },
    SENTINEL,
];

static SECMON_PATCHES_301: [PatchEntry; 2] = [
    PatchEntry {
        offset: 0xA30,
        value: NOP,
    },
    SENTINEL,
];

static SECMON_PATCHES_400: [PatchEntry; 3] = [
    PatchEntry {
        offset: 0xB94,
        value: NOP,
    },
    PatchEntry {
        offset: 0xBA8,
        value: NOP,
    },
    SENTINEL,
];

static SECMON_PATCHES_500: [PatchEntry; 3] = [
    PatchEntry {
        offset: 0xDA8,
        value: NOP,
    },
    PatchEntry {
        offset: 0xDBC,
        value: NOP,
    },
    SENTINEL,
];

static KERNEL_PATCHES_301: [PatchEntry; 3] = [
    PatchEntry {
        offset: 0x3A38,
        value: MOV_W0_1,
    },
    PatchEntry {
        offset: 0x4C50,
        value: MOV_W0_1,
    },
    SENTINEL,
];

static KERNEL_PATCHES_400: [PatchEntry; 3] = [
    PatchEntry {
        offset: 0x3F68,
        value: MOV_W0_1,
    },
    PatchEntry {
        offset: 0x5310,
        value: MOV_W0_1,
    },
    SENTINEL,
];

static KERNEL_PATCHES_500: [PatchEntry; 3] = [
    PatchEntry {
        offset: 0x4DD8,
        value: MOV_W0_1,
    },
    PatchEntry {
        offset: 0x6100,
        value: MOV_W0_1,
    },
    SENTINEL,
];

static PKG1_IDS: [Package1Descriptor; 8] = [
    Package1Descriptor {
        build_tag: "20161121183008",
        version: FirmwareVersionId::Fw100_200,
        tsec_offset: 0x1900,
        pk11_offset: 0x3FE0,
        secmon_base: 0x4002_B020,
        secmon_patchset: Some(Patchset::new(&SECMON_PATCHES_100)),
        kernel_patchset: None,
    },
    Package1Descriptor {
        build_tag: "20170210155124",
        version: FirmwareVersionId::Fw100_200,
        tsec_offset: 0x1900,
        pk11_offset: 0x3FE0,
        secmon_base: 0x4002_B020,
        secmon_patchset: Some(Patchset::new(&SECMON_PATCHES_100)),
        kernel_patchset: None,
    },
    Package1Descriptor {
        build_tag: "20170519101410",
        version: FirmwareVersionId::Fw300,
        tsec_offset: 0x1900,
        pk11_offset: 0x3FE0,
        secmon_base: 0x4002_B020,
        secmon_patchset: Some(Patchset::new(&SECMON_PATCHES_300)),
        kernel_patchset: None,
    },
    Package1Descriptor {
        build_tag: "20170710161758",
        version: FirmwareVersionId::Fw301,
        tsec_offset: 0x1900,
        pk11_offset: 0x3FE0,
        secmon_base: 0x4002_B020,
        secmon_patchset: Some(Patchset::new(&SECMON_PATCHES_301)),
        kernel_patchset: Some(Patchset::new(&KERNEL_PATCHES_301)),
    },
    Package1Descriptor {
        build_tag: "20170921172629",
        version: FirmwareVersionId::Fw301,
        tsec_offset: 0x1900,
        pk11_offset: 0x3FE0,
        secmon_base: 0x4002_B020,
        secmon_patchset: Some(Patchset::new(&SECMON_PATCHES_301)),
        kernel_patchset: Some(Patchset::new(&KERNEL_PATCHES_301)),
    },
    Package1Descriptor {
        build_tag: "20180220163747",
        version: FirmwareVersionId::Fw400,
        tsec_offset: 0x1900,
        pk11_offset: 0x3FE0,
        secmon_base: 0x4002_D000,
        secmon_patchset: Some(Patchset::new(&SECMON_PATCHES_400)),
        kernel_patchset: Some(Patchset::new(&KERNEL_PATCHES_400)),
    },
    Package1Descriptor {
        build_tag: "20180327233122",
        version: FirmwareVersionId::Fw400,
        tsec_offset: 0x1900,
        pk11_offset: 0x3FE0,
        secmon_base: 0x4002_D000,
        secmon_patchset: Some(Patchset::new(&SECMON_PATCHES_400)),
        kernel_patchset: Some(Patchset::new(&KERNEL_PATCHES_400)),
    },
    Package1Descriptor {
        build_tag: "20180421183008",
        version: FirmwareVersionId::Fw500,
        tsec_offset: 0x3290,
        pk11_offset: 0x4008,
        secmon_base: 0x4003_0000,
        secmon_patchset: Some(Patchset::new(&SECMON_PATCHES_500)),
        kernel_patchset: Some(Patchset::new(&KERNEL_PATCHES_500)),
    },
];

/// Raw build-tag bytes, for diagnostics when identification fails.
pub fn raw_build_tag(pkg1: &[u8]) -> String {
    let end = (PKG1_BUILD_TAG_OFFSET + PKG1_BUILD_TAG_LEN).min(pkg1.len());
    let tag = pkg1.get(PKG1_BUILD_TAG_OFFSET..end).unwrap_or(&[]);
    String::from_utf8_lossy(tag).into_owned()
}

/// Match the blob's embedded build tag against the version table.
pub fn identify(pkg1: &[u8]) -> SwitchbootResult<&'static Package1Descriptor> {
    let tag = pkg1
        .get(PKG1_BUILD_TAG_OFFSET..PKG1_BUILD_TAG_OFFSET + PKG1_BUILD_TAG_LEN)
        .ok_or(SwitchbootError::PKG1_UNKNOWN_VERSION)?;
    PKG1_IDS
        .iter()
        .find(|id| id.build_tag.as_bytes() == tag)
        .ok_or(SwitchbootError::PKG1_UNKNOWN_VERSION)
}

/// PK11 sub-container header, following a 0x10-byte CTR IV.
#[repr(C)]
#[derive(AsBytes, FromBytes, Default, Debug, Clone, Copy)]
pub struct Pk11Header {
    pub magic: u32,
    pub warmboot_size: u32,
    pub secmon_size: u32,
    pub pad: u32,
}

/// The two images carried by a decrypted PK11 sub-container.
pub struct Pk11Image {
    pub warmboot: Vec<u8>,
    pub secmon: Vec<u8>,
}

/// Decrypt the PK11 sub-container in place with the package1 key and split
/// out the warmboot and secure-monitor images.
pub fn unpack_pk11(
    se: &mut dyn KeySlotEngine,
    pkg1: &mut [u8],
    desc: &Package1Descriptor,
) -> SwitchbootResult<Pk11Image> {
    let iv_start = desc.pk11_offset;
    let body_start = iv_start + AES_BLOCK_SIZE;
    if body_start + core::mem::size_of::<Pk11Header>() > pkg1.len() {
        return Err(SwitchbootError::PKG1_TRUNCATED);
    }

    let iv: [u8; AES_BLOCK_SIZE] = pkg1[iv_start..body_start].try_into().unwrap();

    // Header first, to learn the payload sizes.
    let hdr_len = core::mem::size_of::<Pk11Header>();
    se.crypt_ctr(PKG1_KEY_SLOT, &iv, &mut pkg1[body_start..])?;

    let hdr = Pk11Header::read_from_prefix(&pkg1[body_start..])
        .ok_or(SwitchbootError::PKG1_TRUNCATED)?;
    if hdr.magic != PK11_MAGIC {
        return Err(SwitchbootError::PKG1_BAD_PK11_MAGIC);
    }

    let wb_start = body_start + hdr_len;
    let wb_end = wb_start
        .checked_add(hdr.warmboot_size as usize)
        .ok_or(SwitchbootError::PKG1_TRUNCATED)?;
    let sm_end = wb_end
        .checked_add(hdr.secmon_size as usize)
        .ok_or(SwitchbootError::PKG1_TRUNCATED)?;
    if sm_end > pkg1.len() {
        return Err(SwitchbootError::PKG1_TRUNCATED);
    }

    Ok(Pk11Image {
        warmboot: pkg1[wb_start..wb_end].to_vec(),
        secmon: pkg1[wb_end..sm_end].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_known_tag() {
        let mut pkg1 = vec![0u8; 0x40];
        pkg1[PKG1_BUILD_TAG_OFFSET..PKG1_BUILD_TAG_OFFSET + PKG1_BUILD_TAG_LEN]
            .copy_from_slice(b"20180421183008");
        let desc = identify(&pkg1).unwrap();
        assert_eq!(desc.version, FirmwareVersionId::Fw500);
        assert_eq!(desc.tsec_offset, 0x3290);
    }

    #[test]
    fn test_identify_unknown_tag() {
        let mut pkg1 = vec![0u8; 0x40];
        pkg1[PKG1_BUILD_TAG_OFFSET..PKG1_BUILD_TAG_OFFSET + PKG1_BUILD_TAG_LEN]
            .copy_from_slice(b"19700101000000");
        assert_eq!(
            identify(&pkg1).err(),
            Some(SwitchbootError::PKG1_UNKNOWN_VERSION)
        );
        assert_eq!(raw_build_tag(&pkg1), "19700101000000");
    }

    #[test]
    fn test_every_entry_has_full_tag() {
        for id in PKG1_IDS.iter() {
            assert_eq!(id.build_tag.len(), PKG1_BUILD_TAG_LEN);
        }
    }
}
