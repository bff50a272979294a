/*++

Licensed under the Apache-2.0 license.

File Name:

    files.rs

Abstract:

    File contains an in-memory file store for override images.

--*/

use std::collections::HashMap;

use switchboot_drivers::FileStore;
use switchboot_error::{SwitchbootError, SwitchbootResult};

/// File store holding named blobs in memory.
#[derive(Default)]
pub struct RamFileStore {
    files: HashMap<String, Vec<u8>>,
}

impl RamFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, bytes: &[u8]) {
        self.files.insert(path.to_string(), bytes.to_vec());
    }
}

impl FileStore for RamFileStore {
    fn read_file(&mut self, path: &str) -> SwitchbootResult<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or(SwitchbootError::CONFIG_FILE_LOAD_FAILED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_and_absent_files() {
        let mut files = RamFileStore::new();
        files.insert("loader.kip1", &[1, 2, 3]);
        assert_eq!(files.read_file("loader.kip1").unwrap(), [1, 2, 3]);
        assert_eq!(
            files.read_file("sm.kip1").err(),
            Some(SwitchbootError::CONFIG_FILE_LOAD_FAILED)
        );
    }
}
