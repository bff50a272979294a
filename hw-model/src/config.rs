/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains a fixed two-profile configuration source.

--*/

use switchboot_drivers::{ConfigEntry, ConfigSource};
use switchboot_error::{SwitchbootError, SwitchbootResult};

/// Configuration source with fixed stock and hen profiles.
#[derive(Default)]
pub struct StaticConfig {
    stock: Vec<ConfigEntry>,
    hen: Vec<ConfigEntry>,
    unavailable: bool,
}

impl StaticConfig {
    pub fn new(stock: Vec<ConfigEntry>, hen: Vec<ConfigEntry>) -> Self {
        Self {
            stock,
            hen,
            unavailable: false,
        }
    }

    /// Make profile resolution fail, as a missing or corrupt config medium
    /// would.
    pub fn make_unavailable(&mut self) {
        self.unavailable = true;
    }
}

impl ConfigSource for StaticConfig {
    fn profile(&mut self, hen: bool) -> SwitchbootResult<Vec<ConfigEntry>> {
        if self.unavailable {
            return Err(SwitchbootError::CONFIG_PROFILE_UNAVAILABLE);
        }
        Ok(if hen {
            self.hen.clone()
        } else {
            self.stock.clone()
        })
    }
}
