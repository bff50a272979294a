/*++

Licensed under the Apache-2.0 license.

File Name:

    tsec.rs

Abstract:

    File contains a co-processor model answering the keygen query with a
    fixed secret.

--*/

use switchboot_drivers::{Coprocessor, AES_KEY_SIZE};
use switchboot_error::{SwitchbootError, SwitchbootResult};

/// Co-processor answering every keygen query with a fixed secret. Records
/// what it was asked so a test can assert the firmware handed to it.
pub struct FakeTsec {
    secret: [u8; AES_KEY_SIZE],
    fail: bool,
    pub last_purpose: Option<u32>,
    pub last_firmware: Option<Vec<u8>>,
}

impl FakeTsec {
    pub fn new(secret: [u8; AES_KEY_SIZE]) -> Self {
        Self {
            secret,
            fail: false,
            last_purpose: None,
            last_firmware: None,
        }
    }

    /// Make every subsequent query fail as a hardware error would.
    pub fn fail_queries(&mut self) {
        self.fail = true;
    }
}

impl Coprocessor for FakeTsec {
    fn query(&mut self, purpose: u32, firmware: &[u8]) -> SwitchbootResult<[u8; AES_KEY_SIZE]> {
        self.last_purpose = Some(purpose);
        self.last_firmware = Some(firmware.to_vec());
        if self.fail {
            return Err(SwitchbootError::KEYGEN_TSEC_QUERY_FAILED);
        }
        Ok(self.secret)
    }
}
