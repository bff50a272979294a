/*++

Licensed under the Apache-2.0 license.

File Name:

    trace.rs

Abstract:

    File contains a key-slot engine wrapper that records every successful
    operation, for asserting exact slot-routing sequences.

--*/

use switchboot_drivers::{
    KeyAccess, KeySlot, KeySlotEngine, RsaSlot, SecurityEngine, AES_BLOCK_SIZE, AES_KEY_SIZE,
};
use switchboot_error::SwitchbootResult;

/// One recorded engine operation. Key material is never captured, only the
/// slot routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeOp {
    SetKey(KeySlot),
    CryptBlockEcb(KeySlot),
    UnwrapKey { dst: KeySlot, src: KeySlot },
    CryptCtr(KeySlot),
    ClearKey(KeySlot),
    SetKeyAccess(KeySlot, u8),
    SetRsaAccess(RsaSlot, bool),
    LockAll,
}

/// Real security engine behind an operation recorder. Failed calls are not
/// recorded; the trace is the sequence of operations the hardware actually
/// performed.
#[derive(Default)]
pub struct TraceEngine {
    inner: SecurityEngine,
    ops: Vec<SeOp>,
}

impl TraceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations recorded so far, in call order.
    pub fn ops(&self) -> &[SeOp] {
        &self.ops
    }

    /// Drain the recorded operations.
    pub fn take_ops(&mut self) -> Vec<SeOp> {
        core::mem::take(&mut self.ops)
    }
}

impl KeySlotEngine for TraceEngine {
    fn set_key(&mut self, slot: KeySlot, key: &[u8; AES_KEY_SIZE]) -> SwitchbootResult<()> {
        self.inner.set_key(slot, key)?;
        self.ops.push(SeOp::SetKey(slot));
        Ok(())
    }

    fn crypt_block_ecb(
        &mut self,
        slot: KeySlot,
        block: &[u8; AES_BLOCK_SIZE],
    ) -> SwitchbootResult<[u8; AES_BLOCK_SIZE]> {
        let out = self.inner.crypt_block_ecb(slot, block)?;
        self.ops.push(SeOp::CryptBlockEcb(slot));
        Ok(out)
    }

    fn unwrap_key(
        &mut self,
        dst: KeySlot,
        src: KeySlot,
        wrapped: &[u8; AES_BLOCK_SIZE],
    ) -> SwitchbootResult<()> {
        self.inner.unwrap_key(dst, src, wrapped)?;
        self.ops.push(SeOp::UnwrapKey { dst, src });
        Ok(())
    }

    fn crypt_ctr(
        &mut self,
        slot: KeySlot,
        iv: &[u8; AES_BLOCK_SIZE],
        buf: &mut [u8],
    ) -> SwitchbootResult<()> {
        self.inner.crypt_ctr(slot, iv, buf)?;
        self.ops.push(SeOp::CryptCtr(slot));
        Ok(())
    }

    fn clear_key(&mut self, slot: KeySlot) -> SwitchbootResult<()> {
        self.inner.clear_key(slot)?;
        self.ops.push(SeOp::ClearKey(slot));
        Ok(())
    }

    fn set_key_access(&mut self, slot: KeySlot, access: KeyAccess) -> SwitchbootResult<()> {
        self.inner.set_key_access(slot, access)?;
        self.ops.push(SeOp::SetKeyAccess(slot, access.bits()));
        Ok(())
    }

    fn key_access(&self, slot: KeySlot) -> SwitchbootResult<KeyAccess> {
        self.inner.key_access(slot)
    }

    fn set_rsa_access(&mut self, slot: RsaSlot, disabled: bool) -> SwitchbootResult<()> {
        self.inner.set_rsa_access(slot, disabled)?;
        self.ops.push(SeOp::SetRsaAccess(slot, disabled));
        Ok(())
    }

    fn lock_all(&mut self) -> SwitchbootResult<()> {
        self.inner.lock_all()?;
        self.ops.push(SeOp::LockAll);
        Ok(())
    }

    fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}
