/*++

Licensed under the Apache-2.0 license.

File Name:

    console.rs

Abstract:

    File contains console models: one printing to stdout, one recording for
    assertions.

--*/

use std::cell::RefCell;
use std::rc::Rc;

use switchboot_drivers::{Console, StatusLevel};

/// Console printing leveled status lines to stdout.
#[derive(Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn status(&mut self, level: StatusLevel, msg: &str) {
        let prefix = match level {
            StatusLevel::Info => "[*]",
            StatusLevel::Ok => "[+]",
            StatusLevel::Error => "[-]",
        };
        println!("{prefix} {msg}");
    }
}

/// Console capturing every status line. Clones share the captured log, so a
/// test can keep one handle while the boot environment owns another.
#[derive(Default, Clone)]
pub struct RecordingConsole {
    lines: Rc<RefCell<Vec<(StatusLevel, String)>>>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every captured line, in order.
    pub fn lines(&self) -> Vec<(StatusLevel, String)> {
        self.lines.borrow().clone()
    }

    /// Messages recorded at `level`.
    pub fn messages_at(&self, level: StatusLevel) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Console for RecordingConsole {
    fn status(&mut self, level: StatusLevel, msg: &str) {
        self.lines.borrow_mut().push((level, msg.to_string()));
    }
}
