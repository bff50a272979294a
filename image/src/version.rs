/*++

Licensed under the Apache-2.0 license.

File Name:

    version.rs

Abstract:

    File contains the firmware-version enumeration.

--*/

/// Firmware version family a package1 blob belongs to.
///
/// The id selects the keyblob seed and the key-routing branch used during
/// derivation (≤301, 400 or ≥500).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FirmwareVersionId {
    Fw100_200 = 0,
    Fw300 = 1,
    Fw301 = 2,
    Fw400 = 3,
    Fw500 = 4,
}

impl FirmwareVersionId {
    pub const COUNT: usize = 5;

    pub const ALL: [FirmwareVersionId; Self::COUNT] = [
        FirmwareVersionId::Fw100_200,
        FirmwareVersionId::Fw300,
        FirmwareVersionId::Fw301,
        FirmwareVersionId::Fw400,
        FirmwareVersionId::Fw500,
    ];

    /// Index into the keyblob seed table and the keyblob record array.
    ///
    /// Ids past the end of the five-entry table clamp to the last entry,
    /// matching the observed fall-through of the original derivation.
    pub fn keyblob_index(self) -> usize {
        (self as usize).min(Self::COUNT - 1)
    }
}

impl From<FirmwareVersionId> for usize {
    fn from(id: FirmwareVersionId) -> Self {
        id as Self
    }
}
