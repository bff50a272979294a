/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the boot flow: key derivation, package resolution, the
    launch state machine and the hand-off handshake.

--*/

mod boot_env;
mod config;
mod handshake;
mod keygen;
mod launch;

pub use boot_env::BootEnv;
pub use config::apply_profile;
pub use handshake::{handshake_codes, run_handshake, HandshakeCodes};
pub use keygen::{keygen, unwrap_plan, UnwrapStep};
pub use launch::{launch, LaunchContext, LaunchState, Launcher};
