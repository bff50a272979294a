/*++

Licensed under the Apache-2.0 license.

File Name:

    keygen.rs

Abstract:

    File contains the key-derivation chain. It turns the fused secure boot
    key, the co-processor secret and the version keyblob into a populated
    key-slot bank.

--*/

use zeroize::Zeroize;

use switchboot_drivers::{
    Coprocessor, FuseBank, KeyAccess, KeySlot, KeySlotEngine, TSEC_QUERY_KEYGEN,
};
use switchboot_error::SwitchbootResult;
use switchboot_image::seeds;
use switchboot_image::{FirmwareVersionId, Keyblob};

/// One unwrap operation of a version branch: `seed` decrypted under `src`
/// lands in `dst`.
#[derive(Debug, Clone, Copy)]
pub struct UnwrapStep {
    pub seed: &'static [u8; 16],
    pub src: KeySlot,
    pub dst: KeySlot,
}

const PLAN_100_301: [UnwrapStep; 2] = [
    UnwrapStep {
        seed: &seeds::DEVICE_KEY_SEED,
        src: KeySlot::Slot15,
        dst: KeySlot::Slot13,
    },
    UnwrapStep {
        seed: &seeds::MASTER_KEY_SEED_RETAIL,
        src: KeySlot::Slot12,
        dst: KeySlot::Slot12,
    },
];

const PLAN_400: [UnwrapStep; 4] = [
    UnwrapStep {
        seed: &seeds::DEVICE_KEY_SEED_4XX,
        src: KeySlot::Slot15,
        dst: KeySlot::Slot13,
    },
    UnwrapStep {
        seed: &seeds::DEVICE_KEY_SEED,
        src: KeySlot::Slot15,
        dst: KeySlot::Slot15,
    },
    UnwrapStep {
        seed: &seeds::MASTER_KEY_SEED_4XX,
        src: KeySlot::Slot12,
        dst: KeySlot::Slot14,
    },
    UnwrapStep {
        seed: &seeds::MASTER_KEY_SEED_RETAIL,
        src: KeySlot::Slot12,
        dst: KeySlot::Slot12,
    },
];

const PLAN_500: [UnwrapStep; 4] = [
    UnwrapStep {
        seed: &seeds::DEVICE_KEY_SEED_4XX,
        src: KeySlot::Slot15,
        dst: KeySlot::Slot10,
    },
    UnwrapStep {
        seed: &seeds::DEVICE_KEY_SEED,
        src: KeySlot::Slot15,
        dst: KeySlot::Slot15,
    },
    UnwrapStep {
        seed: &seeds::MASTER_KEY_SEED_4XX,
        src: KeySlot::Slot12,
        dst: KeySlot::Slot14,
    },
    UnwrapStep {
        seed: &seeds::MASTER_KEY_SEED_RETAIL,
        src: KeySlot::Slot12,
        dst: KeySlot::Slot12,
    },
];

/// Version branch of the derivation chain, as data: the ordered unwrap
/// operations performed after the keyblob payload has been decrypted.
pub fn unwrap_plan(version: FirmwareVersionId) -> &'static [UnwrapStep] {
    match version {
        FirmwareVersionId::Fw100_200 | FirmwareVersionId::Fw300 | FirmwareVersionId::Fw301 => {
            &PLAN_100_301
        }
        FirmwareVersionId::Fw400 => &PLAN_400,
        FirmwareVersionId::Fw500 => &PLAN_500,
    }
}

/// Run the full derivation chain.
///
/// On success the slot bank holds the package1 key (slot 11), the master
/// key (slot 12), device keys per the version branch, and the package2 key
/// (slot 8). The fused secure boot key is consumed and its slot cleared; it
/// is never used again this run.
///
/// # Arguments
///
/// * `se` - Key slot engine
/// * `fuse` - Fuse bank; the secure boot key is consumed here
/// * `tsec` - Co-processor
/// * `keyblob` - Version keyblob record
/// * `version` - Firmware version of the identified package1
/// * `tsec_fw` - Co-processor firmware extracted from package1
pub fn keygen(
    se: &mut dyn KeySlotEngine,
    fuse: &mut FuseBank,
    tsec: &mut dyn Coprocessor,
    keyblob: &Keyblob,
    version: FirmwareVersionId,
    tsec_fw: &[u8],
) -> SwitchbootResult<()> {
    // Fused secure boot key into its working slot, then restrict both
    // working slots before any secret flows through them.
    let mut sbk = fuse.consume_secure_boot_key()?;
    let sbk_result = se.set_key(KeySlot::Slot14, &sbk);
    sbk.zeroize();
    sbk_result?;
    se.set_key_access(KeySlot::Slot13, KeyAccess::SECURE_ONLY)?;
    se.set_key_access(KeySlot::Slot14, KeyAccess::SECURE_ONLY)?;

    let secret = tsec.query(TSEC_QUERY_KEYGEN, tsec_fw)?;
    se.set_key(KeySlot::Slot13, &secret)?;

    // Keyblob keys from the co-processor secret + fused key.
    let tmp = se.crypt_block_ecb(KeySlot::Slot13, &seeds::KEYBLOB_KEY_SEEDS[0])?;
    se.unwrap_key(KeySlot::Slot15, KeySlot::Slot14, &tmp)?;
    let tmp = se.crypt_block_ecb(
        KeySlot::Slot13,
        &seeds::KEYBLOB_KEY_SEEDS[version.keyblob_index()],
    )?;
    se.unwrap_key(KeySlot::Slot13, KeySlot::Slot14, &tmp)?;

    // The fused key slot must never be used again this run.
    se.clear_key(KeySlot::Slot14)?;

    // CMAC-purpose key. The transform result is unused and the keyblob's
    // CMAC field stays unverified; the trust boundary is the fused secret
    // the unwrapping key derives from.
    let _ = se.crypt_block_ecb(KeySlot::Slot13, &seeds::CMAC_KEY_SEED)?;
    se.unwrap_key(KeySlot::Slot11, KeySlot::Slot13, &seeds::CMAC_KEY_SEED)?;

    // Decrypt the keyblob payload and load the keys it carries.
    let mut decrypted = *keyblob;
    se.crypt_ctr(KeySlot::Slot13, &keyblob.iv, &mut decrypted.payload)?;
    se.set_key(KeySlot::Slot11, decrypted.package1_key())?;
    se.set_key(KeySlot::Slot12, decrypted.master_intermediate_key())?;
    se.set_key(KeySlot::Slot13, decrypted.master_intermediate_key())?;
    decrypted.payload.zeroize();

    // Transform kept for parity with the derivation sequence; the branch
    // unwraps below consume the seeds directly.
    let _ = se.crypt_block_ecb(KeySlot::Slot12, &seeds::MASTER_KEY_SEED_RETAIL)?;

    for step in unwrap_plan(version) {
        se.unwrap_key(step.dst, step.src, step.seed)?;
    }

    // Package2 key, behind an intermediate permission.
    se.set_key_access(KeySlot::Slot8, KeyAccess::SECURE_ONLY)?;
    se.unwrap_key(KeySlot::Slot8, KeySlot::Slot12, &seeds::PKG2_KEY_SEED)?;

    Ok(())
}
