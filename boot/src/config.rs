/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains the profile application step: resolved key/value pairs
    become override images and flags on the launch context.

--*/

use crate::launch::LaunchContext;
use switchboot_drivers::{Console, FileStore};

fn load_override(
    files: &mut dyn FileStore,
    console: &mut dyn Console,
    path: &str,
) -> Option<Vec<u8>> {
    match files.read_file(path) {
        Ok(bytes) => {
            console.ok(&format!("Loaded {path}."));
            Some(bytes)
        }
        Err(_) => {
            // A missing override only aborts the override, not the launch.
            console.error(&format!("Failed to load {path}."));
            None
        }
    }
}

/// Apply a resolved profile to the launch context.
///
/// Recognized keys: `warmboot`, `secmon`, `kernel`, `kip1` (repeatable),
/// `fullsvcperm`, `debugmode`. Unrecognized keys are ignored. Entries apply
/// in profile order; a later occurrence of a single-valued key wins.
pub fn apply_profile(
    ctx: &mut LaunchContext,
    entries: &[switchboot_drivers::ConfigEntry],
    files: &mut dyn FileStore,
    console: &mut dyn Console,
) {
    for entry in entries {
        match entry.key.as_str() {
            "warmboot" => ctx.warmboot_override = load_override(files, console, &entry.value),
            "secmon" => ctx.secmon_override = load_override(files, console, &entry.value),
            "kernel" => ctx.kernel_override = load_override(files, console, &entry.value),
            "kip1" => {
                if let Some(bytes) = load_override(files, console, &entry.value) {
                    ctx.kips.push(bytes);
                }
            }
            "fullsvcperm" => ctx.fullsvcperm = entry.value != "0",
            "debugmode" => ctx.debugmode = entry.value != "0",
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboot_drivers::{ConfigEntry, NullConsole, SwitchbootError, SwitchbootResult};

    struct OneFile;

    impl FileStore for OneFile {
        fn read_file(&mut self, path: &str) -> SwitchbootResult<Vec<u8>> {
            if path == "loader.kip1" {
                Ok(vec![1, 2, 3])
            } else {
                Err(SwitchbootError::CONFIG_FILE_LOAD_FAILED)
            }
        }
    }

    #[test]
    fn test_missing_override_is_skipped() {
        let mut ctx = LaunchContext::default();
        let entries = [
            ConfigEntry::new("kip1", "loader.kip1"),
            ConfigEntry::new("kip1", "sm.kip1"),
            ConfigEntry::new("kernel", "kernel.bin"),
            ConfigEntry::new("fullsvcperm", "1"),
        ];
        apply_profile(&mut ctx, &entries, &mut OneFile, &mut NullConsole);
        assert_eq!(ctx.kips.len(), 1);
        assert!(ctx.kernel_override.is_none());
        assert!(ctx.fullsvcperm);
        assert!(!ctx.debugmode);
    }

    #[test]
    fn test_unrecognized_keys_ignored() {
        let mut ctx = LaunchContext::default();
        let entries = [ConfigEntry::new("theme", "dark")];
        apply_profile(&mut ctx, &entries, &mut OneFile, &mut NullConsole);
        assert!(ctx.kips.is_empty());
        assert!(!ctx.fullsvcperm && !ctx.debugmode);
        assert!(ctx.warmboot_override.is_none() && ctx.secmon_override.is_none());
    }
}
