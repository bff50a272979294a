/*++

Licensed under the Apache-2.0 license.

File Name:

    console.rs

Abstract:

    File contains the status console interface.

--*/

/// Severity of a console status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Ok,
    Error,
}

/// Leveled status console.
///
/// Purely observational; the boot flows never depend on a console call
/// succeeding, so the interface is infallible by construction.
pub trait Console {
    fn status(&mut self, level: StatusLevel, msg: &str);

    fn info(&mut self, msg: &str) {
        self.status(StatusLevel::Info, msg);
    }

    fn ok(&mut self, msg: &str) {
        self.status(StatusLevel::Ok, msg);
    }

    fn error(&mut self, msg: &str) {
        self.status(StatusLevel::Error, msg);
    }
}

/// Console that drops everything.
#[derive(Default)]
pub struct NullConsole;

impl Console for NullConsole {
    fn status(&mut self, _level: StatusLevel, _msg: &str) {}
}
