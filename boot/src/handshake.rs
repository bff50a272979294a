/*++

Licensed under the Apache-2.0 license.

File Name:

    handshake.rs

Abstract:

    File contains the hand-off handshake with the secure monitor.

--*/

use switchboot_drivers::{ClusterControl, Doorbell};
use switchboot_image::FirmwareVersionId;

/// The two command words of the handshake. The numbering matches the secure
/// monitor's own state machine for the firmware family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeCodes {
    /// "package2 available"
    pub available: u32,

    /// "continue boot"
    pub resume: u32,
}

/// Command words for a firmware version.
pub fn handshake_codes(version: FirmwareVersionId) -> HandshakeCodes {
    if version <= FirmwareVersionId::Fw301 {
        HandshakeCodes {
            available: 2,
            resume: 3,
        }
    } else {
        HandshakeCodes {
            available: 3,
            resume: 4,
        }
    }
}

/// Run the hand-off.
///
/// Zeroes both doorbell words, posts the "available" code, starts the
/// secondary context at the secure monitor's load address, spins until the
/// readiness word goes non-zero (no software timeout; the hardware watchdog
/// is the only bound), posts the "continue" code and parks the primary
/// context. The primary issues no further commands.
pub fn run_handshake(
    doorbell: &mut dyn Doorbell,
    cluster: &mut dyn ClusterControl,
    secmon_base: u32,
    version: FirmwareVersionId,
) {
    let codes = handshake_codes(version);

    doorbell.reset();
    doorbell.write_command(codes.available);
    cluster.boot_secondary(secmon_base);
    while doorbell.read_ready() == 0 {
        core::hint::spin_loop();
    }
    doorbell.write_command(codes.resume);
    cluster.halt_primary();
}
