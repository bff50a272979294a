/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains the configuration-profile interface.

--*/

use switchboot_error::SwitchbootResult;

/// One key/value pair from a resolved profile, in profile order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

impl ConfigEntry {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Resolves the selected profile to an ordered set of key/value pairs.
///
/// Profile selection is an external boolean (`hen` vs `stock`), not
/// user-supplied text. Recognized keys are `warmboot`, `secmon`, `kernel`,
/// `kip1` (repeatable), `fullsvcperm` and `debugmode`; the boot flow ignores
/// anything else.
pub trait ConfigSource {
    fn profile(&mut self, hen: bool) -> SwitchbootResult<Vec<ConfigEntry>>;
}
