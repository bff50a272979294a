/*++

Licensed under the Apache-2.0 license.

File Name:

    keyblob.rs

Abstract:

    File contains the keyblob record layout.

--*/

use zerocopy::{AsBytes, FromBytes};

use switchboot_drivers::AES_KEY_SIZE;
use switchboot_error::{SwitchbootError, SwitchbootResult};

/// Keyblob record size (one per firmware version, one storage block each)
pub const KEYBLOB_SIZE: usize = 0x100;

/// CMAC field size
pub const KEYBLOB_CMAC_SIZE: usize = 0x10;

/// CTR initialization-vector field size
pub const KEYBLOB_IV_SIZE: usize = 0x10;

/// Encrypted payload size
pub const KEYBLOB_PAYLOAD_SIZE: usize = 0x90;

/// Offset of the device/master intermediate key within the payload
pub const KEYBLOB_MASTER_KEY_OFFSET: usize = 0x00;

/// Offset of the package1 key within the payload
pub const KEYBLOB_PKG1_KEY_OFFSET: usize = 0x80;

/// Keyblob record: CMAC || IV || payload, padded to one record.
///
/// The CMAC field is carried but never verified; the trust boundary is the
/// fused secret the unwrapping key derives from. Preserved as-is rather than
/// adding a check the original never performed.
#[repr(C)]
#[derive(AsBytes, FromBytes, Clone, Copy)]
pub struct Keyblob {
    pub cmac: [u8; KEYBLOB_CMAC_SIZE],
    pub iv: [u8; KEYBLOB_IV_SIZE],
    pub payload: [u8; KEYBLOB_PAYLOAD_SIZE],
    pub pad: [u8; KEYBLOB_SIZE - KEYBLOB_CMAC_SIZE - KEYBLOB_IV_SIZE - KEYBLOB_PAYLOAD_SIZE],
}

impl Keyblob {
    /// Parse a record from the block read at the keyblob storage offset.
    pub fn read(bytes: &[u8]) -> SwitchbootResult<Self> {
        Self::read_from_prefix(bytes).ok_or(SwitchbootError::KEYBLOB_TRUNCATED)
    }

    /// Package1 key field of the decrypted payload.
    pub fn package1_key(&self) -> &[u8; AES_KEY_SIZE] {
        self.payload[KEYBLOB_PKG1_KEY_OFFSET..KEYBLOB_PKG1_KEY_OFFSET + AES_KEY_SIZE]
            .try_into()
            .unwrap()
    }

    /// Device/master intermediate key field of the decrypted payload.
    pub fn master_intermediate_key(&self) -> &[u8; AES_KEY_SIZE] {
        self.payload[KEYBLOB_MASTER_KEY_OFFSET..KEYBLOB_MASTER_KEY_OFFSET + AES_KEY_SIZE]
            .try_into()
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(core::mem::size_of::<Keyblob>(), KEYBLOB_SIZE);
    }

    #[test]
    fn test_truncated_rejected() {
        assert_eq!(
            Keyblob::read(&[0u8; KEYBLOB_SIZE - 1]).err(),
            Some(SwitchbootError::KEYBLOB_TRUNCATED)
        );
    }

    #[test]
    fn test_key_fields() {
        let mut raw = [0u8; KEYBLOB_SIZE];
        raw[0x20 + KEYBLOB_PKG1_KEY_OFFSET] = 0x11;
        raw[0x20 + KEYBLOB_MASTER_KEY_OFFSET] = 0x22;
        let kb = Keyblob::read(&raw).unwrap();
        assert_eq!(kb.package1_key()[0], 0x11);
        assert_eq!(kb.master_intermediate_key()[0], 0x22);
    }
}
