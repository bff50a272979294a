/*++

Licensed under the Apache-2.0 license.

File Name:

    keygen_tests.rs

Abstract:

    File contains tests of the key-derivation chain's slot routing.

--*/

use switchboot_boot::keygen;
use switchboot_drivers::{FuseBank, KeySlot, KeySlotEngine, SecurityEngine};
use switchboot_error::SwitchbootError;
use switchboot_hw_model::fwgen::{build_keyblob, FwKeys};
use switchboot_hw_model::{FakeTsec, SeOp, TraceEngine};
use switchboot_image::{FirmwareVersionId, Keyblob};

fn derivation_fixture(version: FirmwareVersionId) -> (FwKeys, Keyblob) {
    let keys = FwKeys::sample();
    let record = build_keyblob(&keys, version);
    (keys, Keyblob::read(&record).unwrap())
}

fn expected_ops(version: FirmwareVersionId) -> Vec<SeOp> {
    use KeySlot::*;

    let mut ops = vec![
        SeOp::SetKey(Slot14),
        SeOp::SetKeyAccess(Slot13, 0x15),
        SeOp::SetKeyAccess(Slot14, 0x15),
        SeOp::SetKey(Slot13),
        SeOp::CryptBlockEcb(Slot13),
        SeOp::UnwrapKey {
            dst: Slot15,
            src: Slot14,
        },
        SeOp::CryptBlockEcb(Slot13),
        SeOp::UnwrapKey {
            dst: Slot13,
            src: Slot14,
        },
        SeOp::ClearKey(Slot14),
        SeOp::CryptBlockEcb(Slot13),
        SeOp::UnwrapKey {
            dst: Slot11,
            src: Slot13,
        },
        SeOp::CryptCtr(Slot13),
        SeOp::SetKey(Slot11),
        SeOp::SetKey(Slot12),
        SeOp::SetKey(Slot13),
        SeOp::CryptBlockEcb(Slot12),
    ];

    let branch: &[SeOp] = match version {
        FirmwareVersionId::Fw100_200 | FirmwareVersionId::Fw300 | FirmwareVersionId::Fw301 => &[
            SeOp::UnwrapKey {
                dst: Slot13,
                src: Slot15,
            },
            SeOp::UnwrapKey {
                dst: Slot12,
                src: Slot12,
            },
        ],
        FirmwareVersionId::Fw400 => &[
            SeOp::UnwrapKey {
                dst: Slot13,
                src: Slot15,
            },
            SeOp::UnwrapKey {
                dst: Slot15,
                src: Slot15,
            },
            SeOp::UnwrapKey {
                dst: Slot14,
                src: Slot12,
            },
            SeOp::UnwrapKey {
                dst: Slot12,
                src: Slot12,
            },
        ],
        FirmwareVersionId::Fw500 => &[
            SeOp::UnwrapKey {
                dst: Slot10,
                src: Slot15,
            },
            SeOp::UnwrapKey {
                dst: Slot15,
                src: Slot15,
            },
            SeOp::UnwrapKey {
                dst: Slot14,
                src: Slot12,
            },
            SeOp::UnwrapKey {
                dst: Slot12,
                src: Slot12,
            },
        ],
    };
    ops.extend_from_slice(branch);

    ops.push(SeOp::SetKeyAccess(Slot8, 0x15));
    ops.push(SeOp::UnwrapKey {
        dst: Slot8,
        src: Slot12,
    });
    ops
}

#[test]
fn test_slot_routing_per_version() {
    for version in FirmwareVersionId::ALL {
        let (keys, keyblob) = derivation_fixture(version);
        let mut se = TraceEngine::new();
        let mut fuse = FuseBank::new(keys.sbk);
        let mut tsec = FakeTsec::new(keys.tsec_secret);

        keygen(&mut se, &mut fuse, &mut tsec, &keyblob, version, &[0xF1; 4]).unwrap();

        assert_eq!(se.ops(), &expected_ops(version)[..], "version {version:?}");
    }
}

// The chain must land the same keys the generator computes directly, for
// both the package1 slot and the package2 slot.
#[test]
fn test_derived_keys_match_generator_math() {
    let version = FirmwareVersionId::Fw500;
    let (keys, keyblob) = derivation_fixture(version);
    let mut se = SecurityEngine::new();
    let mut fuse = FuseBank::new(keys.sbk);
    let mut tsec = FakeTsec::new(keys.tsec_secret);
    keygen(&mut se, &mut fuse, &mut tsec, &keyblob, version, &[0xF1; 4]).unwrap();

    let mut check = SecurityEngine::new();
    check.set_key(KeySlot::Slot0, &keys.pkg2_key()).unwrap();
    check.set_key(KeySlot::Slot1, &keys.pkg1_key).unwrap();

    let probe = [0xC3u8; 16];
    assert_eq!(
        se.crypt_block_ecb(KeySlot::Slot8, &probe).unwrap(),
        check.crypt_block_ecb(KeySlot::Slot0, &probe).unwrap()
    );
    assert_eq!(
        se.crypt_block_ecb(KeySlot::Slot11, &probe).unwrap(),
        check.crypt_block_ecb(KeySlot::Slot1, &probe).unwrap()
    );
}

#[test]
fn test_coprocessor_failure_aborts_derivation() {
    let version = FirmwareVersionId::Fw300;
    let (keys, keyblob) = derivation_fixture(version);
    let mut se = TraceEngine::new();
    let mut fuse = FuseBank::new(keys.sbk);
    let mut tsec = FakeTsec::new(keys.tsec_secret);
    tsec.fail_queries();

    assert_eq!(
        keygen(&mut se, &mut fuse, &mut tsec, &keyblob, version, &[]),
        Err(SwitchbootError::KEYGEN_TSEC_QUERY_FAILED)
    );
}

#[test]
fn test_fused_key_single_consumption() {
    let version = FirmwareVersionId::Fw100_200;
    let (keys, keyblob) = derivation_fixture(version);
    let mut fuse = FuseBank::new(keys.sbk);

    let mut se = SecurityEngine::new();
    let mut tsec = FakeTsec::new(keys.tsec_secret);
    keygen(&mut se, &mut fuse, &mut tsec, &keyblob, version, &[]).unwrap();

    // A second chain on the same power cycle cannot re-read the fuse.
    let mut se2 = SecurityEngine::new();
    assert_eq!(
        keygen(&mut se2, &mut fuse, &mut tsec, &keyblob, version, &[]),
        Err(SwitchbootError::DRIVER_FUSE_SBK_CONSUMED)
    );
}
