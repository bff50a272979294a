/*++

Licensed under the Apache-2.0 license.

File Name:

    cluster.rs

Abstract:

    File contains the secondary-context and doorbell models. The two share
    mailbox state so the handshake can complete without a real secure
    monitor, and so a test can observe it after handing the models to the
    boot environment.

--*/

use std::cell::RefCell;
use std::rc::Rc;

use switchboot_drivers::{ClusterControl, Doorbell};

/// Shared handshake state observed by both sides.
#[derive(Default)]
pub struct MailboxState {
    pub command: u32,
    pub ready: u32,
    /// Every command word written, in order.
    pub command_log: Vec<u32>,
    /// Entry address the secondary context was started at.
    pub booted_at: Option<u32>,
    /// Primary context parked.
    pub halted: bool,
}

/// Doorbell backed by shared mailbox state.
#[derive(Clone, Default)]
pub struct SimDoorbell {
    state: Rc<RefCell<MailboxState>>,
}

impl SimDoorbell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Rc<RefCell<MailboxState>> {
        self.state.clone()
    }
}

impl Doorbell for SimDoorbell {
    fn reset(&mut self) {
        let mut state = self.state.borrow_mut();
        state.command = 0;
        state.ready = 0;
    }

    fn write_command(&mut self, code: u32) {
        let mut state = self.state.borrow_mut();
        state.command = code;
        state.command_log.push(code);
    }

    fn read_ready(&mut self) -> u32 {
        self.state.borrow().ready
    }
}

/// Secondary-context model. Booting it plays the secure monitor's part:
/// the readiness word goes non-zero, so the primary's poll terminates.
#[derive(Clone)]
pub struct SimCluster {
    state: Rc<RefCell<MailboxState>>,
}

impl SimCluster {
    pub fn new(doorbell: &SimDoorbell) -> Self {
        Self {
            state: doorbell.state(),
        }
    }
}

impl ClusterControl for SimCluster {
    fn boot_secondary(&mut self, entry_addr: u32) {
        let mut state = self.state.borrow_mut();
        state.booted_at = Some(entry_addr);
        state.ready = 1;
    }

    fn halt_primary(&mut self) {
        self.state.borrow_mut().halted = true;
    }
}
