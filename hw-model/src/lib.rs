/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the software model of the boot hardware: test doubles for
    every driver trait plus a generator for encrypted firmware images.

--*/

mod cluster;
mod config;
mod console;
mod files;
pub mod fwgen;
mod pmc;
mod ram;
mod storage;
mod trace;
mod tsec;

pub use cluster::{MailboxState, SimCluster, SimDoorbell};
pub use config::StaticConfig;
pub use console::{RecordingConsole, StdoutConsole};
pub use files::RamFileStore;
pub use pmc::SimPmc;
pub use ram::SparseRam;
pub use storage::RamStorage;
pub use trace::{SeOp, TraceEngine};
pub use tsec::FakeTsec;
