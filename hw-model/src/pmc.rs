/*++

Licensed under the Apache-2.0 license.

File Name:

    pmc.rs

Abstract:

    File contains the power-management-controller scratch model.

--*/

use std::cell::Cell;
use std::rc::Rc;

use switchboot_drivers::Pmc;

/// Records the published warmboot entry point. Clones share state, so a
/// test can keep a handle while the boot environment owns another.
#[derive(Default, Clone)]
pub struct SimPmc {
    entry: Rc<Cell<Option<u32>>>,
}

impl SimPmc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warmboot_entry(&self) -> Option<u32> {
        self.entry.get()
    }
}

impl Pmc for SimPmc {
    fn set_warmboot_entry(&mut self, addr: u32) {
        self.entry.set(Some(addr));
    }
}
