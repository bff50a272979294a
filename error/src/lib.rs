/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the error type and error codes used across the bootloader.

--*/
#![cfg_attr(not(feature = "std"), no_std)]

use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Switchboot Error Type
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SwitchbootError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: SwitchbootError = SwitchbootError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl SwitchbootError {
    /// Create an error; intended to only be used from const contexts, as we
    /// don't want runtime panics if val is zero. The preferred way to get a
    /// SwitchbootError from a u32 is `SwitchbootError::try_from()`.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("SwitchbootError cannot be 0"),
        }
    }

    // Use the macro to define all error constants
    define_error_constants![
        // Security engine (key-slot bank)
        (
            DRIVER_SE_ENGINE_LOCKED,
            0x00010001,
            "Engine access attempted after the one-way lock"
        ),
        (
            DRIVER_SE_SLOT_UPDATE_DISABLED,
            0x00010002,
            "Key slot update attempted with the update permission disabled"
        ),
        (
            DRIVER_SE_SLOT_USE_DISABLED,
            0x00010003,
            "Key slot use attempted with the use permission disabled"
        ),
        (
            DRIVER_SE_SLOT_READ_DISABLED,
            0x00010004,
            "Key slot read attempted with the read permission disabled"
        ),
        (
            DRIVER_SE_ACCESS_RELAXED,
            0x00010005,
            "Attempt to clear a disable bit in a slot access mask"
        ),
        (
            DRIVER_SE_SLOT_EMPTY,
            0x00010006,
            "Key slot used before any key material was loaded"
        ),
        // Fuse bank
        (
            DRIVER_FUSE_SBK_CONSUMED,
            0x00020001,
            "Secure boot key read more than once this power cycle"
        ),
        // Co-processor
        (
            KEYGEN_TSEC_QUERY_FAILED,
            0x00030001,
            "TSEC co-processor key query returned an error"
        ),
        // Block storage
        (
            DRIVER_STORAGE_READ_FAILED,
            0x00040001,
            "Block storage read failed"
        ),
        (
            DRIVER_STORAGE_OUT_OF_RANGE,
            0x00040002,
            "Block storage read past the end of the medium or partition"
        ),
        // Physical memory map
        (
            DRIVER_MEMORY_OUT_OF_RANGE,
            0x00050001,
            "Physical memory access outside any mapped region"
        ),
        // Package1
        (
            PKG1_UNKNOWN_VERSION,
            0x00060001,
            "No version-table entry matched the package1 build tag"
        ),
        (
            PKG1_TRUNCATED,
            0x00060002,
            "Package1 blob too small for a descriptor-declared offset"
        ),
        (
            PKG1_BAD_PK11_MAGIC,
            0x00060003,
            "PK11 sub-container magic mismatch after decryption"
        ),
        // Keyblob
        (
            KEYBLOB_TRUNCATED,
            0x00070001,
            "Keyblob record shorter than its fixed layout"
        ),
        // Package2
        (
            PKG2_PARTITION_NOT_FOUND,
            0x00080001,
            "Package2 partition absent from the partition directory"
        ),
        (
            PKG2_BAD_MAGIC,
            0x00080002,
            "Package2 header magic mismatch after decryption"
        ),
        (
            PKG2_TRUNCATED,
            0x00080003,
            "Package2 image shorter than its declared section layout"
        ),
        (
            PKG2_BAD_INI1_MAGIC,
            0x00080004,
            "INI1 directory magic mismatch"
        ),
        (
            PKG2_KIP_TRUNCATED,
            0x00080005,
            "KIP1 record extends past the end of the INI1 section"
        ),
        (
            PKG2_BAD_KIP_MAGIC,
            0x00080006,
            "KIP1 record magic mismatch"
        ),
        (
            PKG2_PATCH_OUT_OF_RANGE,
            0x00080007,
            "Patch entry lands past the end of the kernel image"
        ),
        // Configuration
        (
            CONFIG_FILE_LOAD_FAILED,
            0x00090001,
            "Configuration-requested override file missing or unreadable"
        ),
        (
            CONFIG_PROFILE_UNAVAILABLE,
            0x00090002,
            "Configuration profile could not be resolved"
        ),
        // Launch orchestrator
        (
            LAUNCH_BAD_STATE,
            0x000A0001,
            "Launch state machine transition out of order"
        ),
    ];
}

impl From<core::num::NonZeroU32> for SwitchbootError {
    fn from(val: NonZeroU32) -> Self {
        Self(val)
    }
}

impl From<SwitchbootError> for core::num::NonZeroU32 {
    fn from(val: SwitchbootError) -> Self {
        val.0
    }
}

impl From<SwitchbootError> for u32 {
    fn from(val: SwitchbootError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for SwitchbootError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(SwitchbootError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type SwitchbootResult<T> = Result<T, SwitchbootError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_try_from() {
        assert!(SwitchbootError::try_from(0).is_err());
        assert_eq!(
            Ok(SwitchbootError::DRIVER_SE_ENGINE_LOCKED),
            SwitchbootError::try_from(0x00010001)
        );
    }

    #[test]
    fn test_error_constants_uniqueness() {
        let constants = SwitchbootError::all_constants();
        let mut error_values = HashSet::new();
        let mut duplicates = Vec::new();

        for (name, value) in constants {
            if !error_values.insert(value) {
                duplicates.push((name, value));
            }
        }

        assert!(
            duplicates.is_empty(),
            "Found duplicate error codes: {:?}",
            duplicates
        );
    }
}
