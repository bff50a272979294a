/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the fixed-layout firmware container formats: the keyblob
    record, the package1 boot blob and its PK11 sub-container, and the
    package2 kernel+services container with its INI1 directory.

--*/

mod keyblob;
mod kip;
mod patch;
mod pkg1;
mod pkg2;
pub mod seeds;
mod version;

pub use keyblob::{
    Keyblob, KEYBLOB_CMAC_SIZE, KEYBLOB_IV_SIZE, KEYBLOB_MASTER_KEY_OFFSET, KEYBLOB_PAYLOAD_SIZE,
    KEYBLOB_PKG1_KEY_OFFSET, KEYBLOB_SIZE,
};
pub use kip::{
    kip1_name, Ini1Header, Kip1Header, Kip1Section, KipDirectory, KipEntry, INI1_MAGIC, KIP1_MAGIC,
    KIP1_NAME_LEN, KIP1_SECTION_COUNT,
};
pub use patch::{apply_entries_to_slice, PatchEntry, Patchset, PATCH_SENTINEL};
pub use pkg1::{
    identify, raw_build_tag, unpack_pk11, Package1Descriptor, Pk11Header, Pk11Image,
    PKG1_BUILD_TAG_LEN, PKG1_BUILD_TAG_OFFSET, PKG1_KEY_SLOT, PK11_MAGIC,
};
pub use pkg2::{
    build_encrypt, decrypt, key_slot_for_version, recover_size, Pkg2Header, Pkg2View, PKG2_BASE,
    PKG2_HDR_SIZE, PKG2_INI1_BASE, PKG2_MAGIC, PKG2_SEC_COUNT, PKG2_SEC_CTR_SIZE, PKG2_SEC_INI1,
    PKG2_SEC_KERNEL, PKG2_SIG_SIZE, PKG2_SIZE_XOR_WORDS,
};
pub use version::FirmwareVersionId;
