/*++

Licensed under the Apache-2.0 license.

File Name:

    se.rs

Abstract:

    File contains API for the security-engine key-slot bank.

--*/

use aes::Aes128;
use bitfield::bitfield;
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use zeroize::Zeroize;

use switchboot_error::{SwitchbootError, SwitchbootResult};

/// AES key size in bytes
pub const AES_KEY_SIZE: usize = 16;

/// AES block size in bytes
pub const AES_BLOCK_SIZE: usize = 16;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Symmetric Key Slot Identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    Slot0 = 0,
    Slot1 = 1,
    Slot2 = 2,
    Slot3 = 3,
    Slot4 = 4,
    Slot5 = 5,
    Slot6 = 6,
    Slot7 = 7,
    Slot8 = 8,
    Slot9 = 9,
    Slot10 = 10,
    Slot11 = 11,
    Slot12 = 12,
    Slot13 = 13,
    Slot14 = 14,
    Slot15 = 15,
}

impl KeySlot {
    /// Number of symmetric key slots in the bank
    pub const COUNT: usize = 16;

    pub const ALL: [KeySlot; Self::COUNT] = [
        KeySlot::Slot0,
        KeySlot::Slot1,
        KeySlot::Slot2,
        KeySlot::Slot3,
        KeySlot::Slot4,
        KeySlot::Slot5,
        KeySlot::Slot6,
        KeySlot::Slot7,
        KeySlot::Slot8,
        KeySlot::Slot9,
        KeySlot::Slot10,
        KeySlot::Slot11,
        KeySlot::Slot12,
        KeySlot::Slot13,
        KeySlot::Slot14,
        KeySlot::Slot15,
    ];
}

impl From<KeySlot> for usize {
    fn from(slot: KeySlot) -> Self {
        slot as Self
    }
}

impl From<KeySlot> for u32 {
    fn from(slot: KeySlot) -> Self {
        slot as Self
    }
}

/// Asymmetric Key Slot Identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaSlot {
    Rsa0 = 0,
    Rsa1 = 1,
}

impl RsaSlot {
    /// Number of asymmetric key slots in the bank
    pub const COUNT: usize = 2;
}

impl From<RsaSlot> for usize {
    fn from(slot: RsaSlot) -> Self {
        slot as Self
    }
}

bitfield! {
    /// Key slot access control. Bits are disable flags; a set bit turns the
    /// corresponding operation off. The mask is monotonic over a run: bits
    /// may be set, never cleared.
    #[derive(Default, PartialEq, Eq, Clone, Copy)]
    pub struct KeyAccess(u8);
    impl Debug;

    /// Key material readback disabled
    pub dis_keyread, set_dis_keyread: 0;

    /// Key material update disabled
    pub dis_keyupdate, set_dis_keyupdate: 1;

    /// Original IV readback disabled
    pub dis_origiv_read, set_dis_origiv_read: 2;

    /// Original IV update disabled
    pub dis_origiv_update, set_dis_origiv_update: 3;

    /// Updated IV readback disabled
    pub dis_updatediv_read, set_dis_updatediv_read: 4;

    /// Updated IV update disabled
    pub dis_updatediv_update, set_dis_updatediv_update: 5;

    /// Key use in crypto operations disabled
    pub dis_keyuse, set_dis_keyuse: 6;

    /// Key use for further derivation disabled
    pub dis_dkeyuse, set_dis_dkeyuse: 7;
}

impl KeyAccess {
    /// No restrictions (power-on state)
    pub const OPEN: KeyAccess = KeyAccess(0x00);

    /// All readback paths disabled; use and update still allowed
    pub const SECURE_ONLY: KeyAccess = KeyAccess(0x15);

    /// Everything disabled
    pub const DISABLED: KeyAccess = KeyAccess(0xFF);

    /// Raw mask value
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Construct from a raw mask value
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }
}

/// Key-slot engine operations
///
/// This is the only interface the derivation chain and the package pipelines
/// are allowed to use; nothing above the engine touches key material
/// directly.
pub trait KeySlotEngine {
    /// Load raw key material into a slot, replacing its previous contents.
    /// No side effect on any other slot.
    fn set_key(&mut self, slot: KeySlot, key: &[u8; AES_KEY_SIZE]) -> SwitchbootResult<()>;

    /// Single-block ECB encrypt of `block` under the slot's key.
    fn crypt_block_ecb(
        &mut self,
        slot: KeySlot,
        block: &[u8; AES_BLOCK_SIZE],
    ) -> SwitchbootResult<[u8; AES_BLOCK_SIZE]>;

    /// Unwrap `wrapped` into `dst` using `src` as the unwrapping key
    /// (single-block ECB decrypt). The plaintext key never leaves the bank.
    fn unwrap_key(
        &mut self,
        dst: KeySlot,
        src: KeySlot,
        wrapped: &[u8; AES_BLOCK_SIZE],
    ) -> SwitchbootResult<()>;

    /// AES-128-CTR transform of `buf` in place, counter derived from `iv`.
    fn crypt_ctr(
        &mut self,
        slot: KeySlot,
        iv: &[u8; AES_BLOCK_SIZE],
        buf: &mut [u8],
    ) -> SwitchbootResult<()>;

    /// Zero a slot's key material.
    fn clear_key(&mut self, slot: KeySlot) -> SwitchbootResult<()>;

    /// Tighten a slot's access mask. The new mask must be a superset of the
    /// old disable bits.
    fn set_key_access(&mut self, slot: KeySlot, access: KeyAccess) -> SwitchbootResult<()>;

    /// Read back a slot's access mask.
    fn key_access(&self, slot: KeySlot) -> SwitchbootResult<KeyAccess>;

    /// Disable an RSA slot.
    fn set_rsa_access(&mut self, slot: RsaSlot, disabled: bool) -> SwitchbootResult<()>;

    /// One-way lock: restrict every slot to SECURE_ONLY, disable both RSA
    /// slots and flip the global security bit. Every later engine call from
    /// this context fails. Must be the last engine operation before control
    /// transfers to the secure monitor.
    fn lock_all(&mut self) -> SwitchbootResult<()>;

    /// Global lock status.
    fn is_locked(&self) -> bool;
}

#[derive(Clone)]
struct SlotState {
    key: [u8; AES_KEY_SIZE],
    loaded: bool,
    access: KeyAccess,
}

impl Default for SlotState {
    fn default() -> Self {
        Self {
            key: [0; AES_KEY_SIZE],
            loaded: false,
            access: KeyAccess::OPEN,
        }
    }
}

impl Drop for SlotState {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Security engine key-slot bank.
///
/// Register-level state model of the fixed bank of hardware AES/RSA key
/// slots; the AES transforms themselves are real. Binding the model to the
/// memory-mapped register file is the platform layer's concern and out of
/// scope here.
#[derive(Default)]
pub struct SecurityEngine {
    slots: [SlotState; KeySlot::COUNT],
    rsa_disabled: [bool; RsaSlot::COUNT],
    locked: bool,
}

impl SecurityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, slot: KeySlot) -> &SlotState {
        &self.slots[usize::from(slot)]
    }

    fn check_unlocked(&self) -> SwitchbootResult<()> {
        if self.locked {
            return Err(SwitchbootError::DRIVER_SE_ENGINE_LOCKED);
        }
        Ok(())
    }

    fn usable_key(&self, slot: KeySlot) -> SwitchbootResult<&[u8; AES_KEY_SIZE]> {
        let state = self.slot(slot);
        if state.access.dis_keyuse() {
            return Err(SwitchbootError::DRIVER_SE_SLOT_USE_DISABLED);
        }
        if !state.loaded {
            return Err(SwitchbootError::DRIVER_SE_SLOT_EMPTY);
        }
        Ok(&state.key)
    }

    fn check_updatable(&self, slot: KeySlot) -> SwitchbootResult<()> {
        if self.slot(slot).access.dis_keyupdate() {
            return Err(SwitchbootError::DRIVER_SE_SLOT_UPDATE_DISABLED);
        }
        Ok(())
    }
}

impl KeySlotEngine for SecurityEngine {
    fn set_key(&mut self, slot: KeySlot, key: &[u8; AES_KEY_SIZE]) -> SwitchbootResult<()> {
        self.check_unlocked()?;
        self.check_updatable(slot)?;
        let state = &mut self.slots[usize::from(slot)];
        state.key = *key;
        state.loaded = true;
        Ok(())
    }

    fn crypt_block_ecb(
        &mut self,
        slot: KeySlot,
        block: &[u8; AES_BLOCK_SIZE],
    ) -> SwitchbootResult<[u8; AES_BLOCK_SIZE]> {
        self.check_unlocked()?;
        let key = self.usable_key(slot)?;
        let cipher = Aes128::new(GenericArray::from_slice(key));
        let mut out = GenericArray::clone_from_slice(block);
        cipher.encrypt_block(&mut out);
        Ok(out.into())
    }

    fn unwrap_key(
        &mut self,
        dst: KeySlot,
        src: KeySlot,
        wrapped: &[u8; AES_BLOCK_SIZE],
    ) -> SwitchbootResult<()> {
        self.check_unlocked()?;
        self.check_updatable(dst)?;
        let key = self.usable_key(src)?;
        let cipher = Aes128::new(GenericArray::from_slice(key));
        let mut out = GenericArray::clone_from_slice(wrapped);
        cipher.decrypt_block(&mut out);
        let state = &mut self.slots[usize::from(dst)];
        state.key = out.into();
        state.loaded = true;
        Ok(())
    }

    fn crypt_ctr(
        &mut self,
        slot: KeySlot,
        iv: &[u8; AES_BLOCK_SIZE],
        buf: &mut [u8],
    ) -> SwitchbootResult<()> {
        self.check_unlocked()?;
        let key = self.usable_key(slot)?;
        let mut cipher = Aes128Ctr::new(key.into(), iv.into());
        cipher.apply_keystream(buf);
        Ok(())
    }

    fn clear_key(&mut self, slot: KeySlot) -> SwitchbootResult<()> {
        self.check_unlocked()?;
        self.check_updatable(slot)?;
        let state = &mut self.slots[usize::from(slot)];
        state.key.zeroize();
        state.loaded = false;
        Ok(())
    }

    fn set_key_access(&mut self, slot: KeySlot, access: KeyAccess) -> SwitchbootResult<()> {
        self.check_unlocked()?;
        let state = &mut self.slots[usize::from(slot)];
        // Disable bits are sticky for the rest of the run.
        if access.bits() & state.access.bits() != state.access.bits() {
            return Err(SwitchbootError::DRIVER_SE_ACCESS_RELAXED);
        }
        state.access = access;
        Ok(())
    }

    fn key_access(&self, slot: KeySlot) -> SwitchbootResult<KeyAccess> {
        self.check_unlocked()?;
        Ok(self.slot(slot).access)
    }

    fn set_rsa_access(&mut self, slot: RsaSlot, disabled: bool) -> SwitchbootResult<()> {
        self.check_unlocked()?;
        if !disabled && self.rsa_disabled[usize::from(slot)] {
            return Err(SwitchbootError::DRIVER_SE_ACCESS_RELAXED);
        }
        self.rsa_disabled[usize::from(slot)] = disabled;
        Ok(())
    }

    fn lock_all(&mut self) -> SwitchbootResult<()> {
        self.check_unlocked()?;
        for state in self.slots.iter_mut() {
            state.access = KeyAccess::from_bits(state.access.bits() | KeyAccess::SECURE_ONLY.bits());
        }
        self.rsa_disabled = [true; RsaSlot::COUNT];
        self.locked = true;
        Ok(())
    }

    fn is_locked(&self) -> bool {
        self.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // FIPS-197 appendix B key/plaintext/ciphertext.
    const KEY: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
        0x3c,
    ];
    const PLAIN: [u8; 16] = [
        0x32, 0x43, 0xf6, 0xa8, 0x88, 0x5a, 0x30, 0x8d, 0x31, 0x31, 0x98, 0xa2, 0xe0, 0x37, 0x07,
        0x34,
    ];
    const CIPHER: [u8; 16] = [
        0x39, 0x25, 0x84, 0x1d, 0x02, 0xdc, 0x09, 0xfb, 0xdc, 0x11, 0x85, 0x97, 0x19, 0x6a, 0x0b,
        0x32,
    ];

    #[test]
    fn test_ecb_crypt_block() {
        let mut se = SecurityEngine::new();
        se.set_key(KeySlot::Slot0, &KEY).unwrap();
        assert_eq!(se.crypt_block_ecb(KeySlot::Slot0, &PLAIN).unwrap(), CIPHER);
    }

    #[test]
    fn test_unwrap_key_is_ecb_decrypt() {
        let mut se = SecurityEngine::new();
        se.set_key(KeySlot::Slot0, &KEY).unwrap();
        se.unwrap_key(KeySlot::Slot1, KeySlot::Slot0, &CIPHER).unwrap();
        // Slot1 now holds PLAIN; verify by encrypting a known block under it.
        se.set_key(KeySlot::Slot2, &PLAIN).unwrap();
        let a = se.crypt_block_ecb(KeySlot::Slot1, &[0u8; 16]).unwrap();
        let b = se.crypt_block_ecb(KeySlot::Slot2, &[0u8; 16]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ctr_round_trip() {
        let mut se = SecurityEngine::new();
        se.set_key(KeySlot::Slot3, &KEY).unwrap();
        let iv = [7u8; 16];
        let plain: Vec<u8> = (0u8..255).collect();
        let mut buf = plain.clone();
        se.crypt_ctr(KeySlot::Slot3, &iv, &mut buf).unwrap();
        assert_ne!(buf, plain);
        se.crypt_ctr(KeySlot::Slot3, &iv, &mut buf).unwrap();
        assert_eq!(buf, plain);
    }

    #[test]
    fn test_empty_slot_rejected() {
        let mut se = SecurityEngine::new();
        assert_eq!(
            se.crypt_block_ecb(KeySlot::Slot5, &PLAIN),
            Err(SwitchbootError::DRIVER_SE_SLOT_EMPTY)
        );
    }

    #[test]
    fn test_access_mask_is_monotonic() {
        let mut se = SecurityEngine::new();
        se.set_key_access(KeySlot::Slot4, KeyAccess::SECURE_ONLY)
            .unwrap();
        assert_eq!(
            se.set_key_access(KeySlot::Slot4, KeyAccess::OPEN),
            Err(SwitchbootError::DRIVER_SE_ACCESS_RELAXED)
        );
        // Tightening further is allowed.
        se.set_key_access(KeySlot::Slot4, KeyAccess::DISABLED)
            .unwrap();
    }

    #[test]
    fn test_secure_only_still_usable() {
        let mut se = SecurityEngine::new();
        se.set_key(KeySlot::Slot6, &KEY).unwrap();
        se.set_key_access(KeySlot::Slot6, KeyAccess::SECURE_ONLY)
            .unwrap();
        assert!(se.crypt_block_ecb(KeySlot::Slot6, &PLAIN).is_ok());
        // Update is still allowed under SECURE_ONLY.
        assert!(se.set_key(KeySlot::Slot6, &KEY).is_ok());
    }

    #[test]
    fn test_disabled_slot_unusable() {
        let mut se = SecurityEngine::new();
        se.set_key(KeySlot::Slot7, &KEY).unwrap();
        se.set_key_access(KeySlot::Slot7, KeyAccess::DISABLED)
            .unwrap();
        assert_eq!(
            se.crypt_block_ecb(KeySlot::Slot7, &PLAIN),
            Err(SwitchbootError::DRIVER_SE_SLOT_USE_DISABLED)
        );
        assert_eq!(
            se.set_key(KeySlot::Slot7, &KEY),
            Err(SwitchbootError::DRIVER_SE_SLOT_UPDATE_DISABLED)
        );
    }

    #[test]
    fn test_lock_all_is_terminal() {
        let mut se = SecurityEngine::new();
        se.set_key(KeySlot::Slot0, &KEY).unwrap();
        se.lock_all().unwrap();
        assert!(se.is_locked());
        assert_eq!(
            se.set_key(KeySlot::Slot0, &KEY),
            Err(SwitchbootError::DRIVER_SE_ENGINE_LOCKED)
        );
        assert_eq!(
            se.crypt_block_ecb(KeySlot::Slot0, &PLAIN),
            Err(SwitchbootError::DRIVER_SE_ENGINE_LOCKED)
        );
        assert_eq!(
            se.key_access(KeySlot::Slot0),
            Err(SwitchbootError::DRIVER_SE_ENGINE_LOCKED)
        );
        assert_eq!(se.lock_all(), Err(SwitchbootError::DRIVER_SE_ENGINE_LOCKED));
    }
}
