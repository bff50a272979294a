/*++

Licensed under the Apache-2.0 license.

File Name:

    doorbell.rs

Abstract:

    File contains the two-word mailbox doorbell interface.

--*/

/// The doorbell pair used to hand off control between execution contexts:
/// an inbound command word and an outbound readiness word at fixed physical
/// addresses, both zero at reset.
///
/// This is an unbuffered, single-message-at-a-time synchronous handshake;
/// the primary context polls `read_ready` with no software timeout (the
/// hardware watchdog is the only bound).
pub trait Doorbell {
    /// Zero both words.
    fn reset(&mut self);

    /// Write the inbound command word.
    fn write_command(&mut self, code: u32);

    /// Read the outbound readiness word.
    fn read_ready(&mut self) -> u32;
}
