/*++

Licensed under the Apache-2.0 license.

File Name:

    fuse.rs

Abstract:

    File contains API for the fuse bank.

--*/

use zeroize::Zeroize;

use crate::AES_KEY_SIZE;
use switchboot_error::{SwitchbootError, SwitchbootResult};

/// Fuse bank holding the hardware-fused secure boot key.
///
/// The key is readable exactly once per power cycle; the first read hands
/// the material out and burns the copy held here.
pub struct FuseBank {
    sbk: [u8; AES_KEY_SIZE],
    consumed: bool,
}

impl FuseBank {
    /// Create a fuse bank seeded with the given secure boot key.
    pub fn new(sbk: [u8; AES_KEY_SIZE]) -> Self {
        Self {
            sbk,
            consumed: false,
        }
    }

    /// Consume the secure boot key.
    ///
    /// # Returns
    ///
    /// * The fused key material; fails on any read after the first.
    pub fn consume_secure_boot_key(&mut self) -> SwitchbootResult<[u8; AES_KEY_SIZE]> {
        if self.consumed {
            return Err(SwitchbootError::DRIVER_FUSE_SBK_CONSUMED);
        }
        let key = self.sbk;
        self.sbk.zeroize();
        self.consumed = true;
        Ok(key)
    }
}

impl Drop for FuseBank {
    fn drop(&mut self) {
        self.sbk.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbk_single_read() {
        let mut fuse = FuseBank::new([0xAA; 16]);
        assert_eq!(fuse.consume_secure_boot_key().unwrap(), [0xAA; 16]);
        assert_eq!(
            fuse.consume_secure_boot_key(),
            Err(SwitchbootError::DRIVER_FUSE_SBK_CONSUMED)
        );
    }
}
