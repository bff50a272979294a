/*++

Licensed under the Apache-2.0 license.

File Name:

    vfs.rs

Abstract:

    File contains the file-store interface used for override images.

--*/

use switchboot_error::SwitchbootResult;

/// File store used to load configuration-selected override images.
///
/// Absence of a requested file is a normal, reported failure
/// (`CONFIG_FILE_LOAD_FAILED`), never a crash.
pub trait FileStore {
    /// Read the whole file at `path`.
    fn read_file(&mut self, path: &str) -> SwitchbootResult<Vec<u8>>;
}
