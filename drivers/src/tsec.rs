/*++

Licensed under the Apache-2.0 license.

File Name:

    tsec.rs

Abstract:

    File contains the co-processor key-query interface.

--*/

use crate::AES_KEY_SIZE;
use switchboot_error::SwitchbootResult;

/// Query purpose id used during key derivation.
pub const TSEC_QUERY_KEYGEN: u32 = 1;

/// TSEC co-processor.
///
/// The co-processor runs the firmware blob extracted from package1 and
/// answers a single key query. Once started it cannot be stopped short of a
/// full hardware reset.
pub trait Coprocessor {
    /// Run `firmware` on the co-processor and query the 16-byte secret for
    /// `purpose`. A hardware error surfaces as `KEYGEN_TSEC_QUERY_FAILED`.
    fn query(&mut self, purpose: u32, firmware: &[u8]) -> SwitchbootResult<[u8; AES_KEY_SIZE]>;
}
