/*++

Licensed under the Apache-2.0 license.

File Name:

    launch.rs

Abstract:

    File contains the launch state machine driving the whole boot flow.

--*/

use crate::boot_env::BootEnv;
use crate::config::apply_profile;
use crate::handshake::run_handshake;
use crate::keygen::keygen;
use switchboot_drivers::memory_layout::{
    BOOTCFG_ADDR, BOOTCFG_SIZE, KEYBLOB_STORAGE_OFFSET, PKG1_SIZE, PKG1_STORAGE_OFFSET,
    PKG2_LOAD_ADDR, PKG2_PARTITION_NAME, PKG2_PARTITION_SUBOFFSET, WARMBOOT_ADDR,
};
use switchboot_drivers::{read_at, KeyAccess, KeySlot, BLOCK_SIZE};
use switchboot_error::{SwitchbootError, SwitchbootResult};
use switchboot_image::{
    apply_entries_to_slice, build_encrypt, decrypt, identify, raw_build_tag, recover_size,
    unpack_pk11, Keyblob, KipDirectory, Package1Descriptor, PatchEntry,
};

/// Launch progress. Forward-only; a failed attempt is abandoned, never
/// resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Pkg1Loaded,
    KeysGenerated,
    Pkg1Resolved,
    Pkg2Ready,
    HandshakeStarted,
    Halted,
}

/// Per-attempt aggregate: loaded blobs, configuration overrides and flags.
/// Created empty, populated by the configuration and loader stages, consumed
/// once.
#[derive(Default)]
pub struct LaunchContext {
    pub pkg1: Vec<u8>,
    pub descriptor: Option<&'static Package1Descriptor>,
    pub keyblob: Option<Keyblob>,
    pub warmboot_override: Option<Vec<u8>>,
    pub secmon_override: Option<Vec<u8>>,
    pub kernel_override: Option<Vec<u8>>,
    pub kips: Vec<Vec<u8>>,
    pub fullsvcperm: bool,
    pub debugmode: bool,
}

impl LaunchContext {
    /// Whether package2 must be modified, forcing the rebuild path.
    pub fn wants_patched_path(&self) -> bool {
        self.kernel_override.is_some()
            || !self.kips.is_empty()
            || self.fullsvcperm
            || self.debugmode
    }
}

/// Drives one launch attempt through its states.
pub struct Launcher {
    state: LaunchState,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    pub fn new() -> Self {
        Self {
            state: LaunchState::Idle,
        }
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Run the launch to its terminal state. A launcher runs once; a second
    /// call fails.
    pub fn run(&mut self, env: &mut BootEnv, hen: bool) -> SwitchbootResult<()> {
        if self.state != LaunchState::Idle {
            return Err(SwitchbootError::LAUNCH_BAD_STATE);
        }

        // Configuration applies before anything is read from storage.
        let mut ctx = LaunchContext::default();
        let entries = env.config.profile(hen)?;
        apply_profile(&mut ctx, &entries, env.files.as_mut(), env.console.as_mut());

        // Package1 and the matching keyblob.
        ctx.pkg1 = vec![0u8; PKG1_SIZE];
        read_at(env.storage.as_mut(), PKG1_STORAGE_OFFSET, &mut ctx.pkg1)?;
        let desc = match identify(&ctx.pkg1) {
            Ok(desc) => desc,
            Err(err) => {
                env.console.error(&format!(
                    "Could not identify pkg1 version (= '{}').",
                    raw_build_tag(&ctx.pkg1)
                ));
                return Err(err);
            }
        };
        ctx.descriptor = Some(desc);
        env.console.info(&format!(
            "Identified pkg1 ('{}'), keyblob {}.",
            desc.build_tag,
            desc.version.keyblob_index()
        ));

        let mut record = [0u8; BLOCK_SIZE];
        read_at(
            env.storage.as_mut(),
            KEYBLOB_STORAGE_OFFSET + desc.version.keyblob_index() as u64 * BLOCK_SIZE as u64,
            &mut record,
        )?;
        let keyblob = Keyblob::read(&record)?;
        ctx.keyblob = Some(keyblob);
        env.console.ok("Loaded pkg1 and keyblob.");
        self.state = LaunchState::Pkg1Loaded;

        // Key derivation; failure aborts the whole launch.
        keygen(
            env.se.as_mut(),
            &mut env.fuse,
            env.tsec.as_mut(),
            &keyblob,
            desc.version,
            &ctx.pkg1[desc.tsec_offset..],
        )?;
        env.console.ok("Generated keys.");
        self.state = LaunchState::KeysGenerated;

        env.pmc.set_warmboot_entry(WARMBOOT_ADDR);

        // Warmboot + secure monitor, from overrides or the PK11
        // sub-container. Unpack is skipped only when both overrides are
        // present.
        let secmon_overridden = ctx.secmon_override.is_some();
        let (warmboot, secmon) = match (ctx.warmboot_override.take(), ctx.secmon_override.take()) {
            (Some(warmboot), Some(secmon)) => (warmboot, secmon),
            (warmboot, secmon) => {
                let pk11 = unpack_pk11(env.se.as_mut(), &mut ctx.pkg1, desc)?;
                (
                    warmboot.unwrap_or(pk11.warmboot),
                    secmon.unwrap_or(pk11.secmon),
                )
            }
        };
        env.mem.write_bytes(WARMBOOT_ADDR, &warmboot)?;
        env.mem.write_bytes(desc.secmon_base, &secmon)?;
        env.console.ok("Loaded warmboot and secmon.");
        self.state = LaunchState::Pkg1Resolved;

        let patched = ctx.wants_patched_path();

        // A rebuilt package2 is unsigned; the secure monitor must be
        // patched to accept it. An overridden monitor is taken as-is.
        if patched && !secmon_overridden {
            if let Some(patchset) = desc.secmon_patchset {
                patchset.apply_to_memory(env.mem.as_mut(), desc.secmon_base)?;
                env.console.ok("Patched secmon.");
            }
        }

        // Package2: locate, size-recover, read, decrypt.
        let partition = env
            .storage
            .find_partition(PKG2_PARTITION_NAME)?
            .ok_or(SwitchbootError::PKG2_PARTITION_NOT_FOUND)
            .map_err(|err| {
                env.console.error("Failed to locate pkg2 partition.");
                err
            })?;
        let pkg2_offset = partition.start_block * BLOCK_SIZE as u64 + PKG2_PARTITION_SUBOFFSET;

        let mut header_block = [0u8; BLOCK_SIZE];
        read_at(env.storage.as_mut(), pkg2_offset, &mut header_block)?;
        let size = recover_size(&header_block)? as usize;
        let aligned = (size + BLOCK_SIZE - 1) / BLOCK_SIZE * BLOCK_SIZE;
        let mut container = vec![0u8; aligned];
        read_at(env.storage.as_mut(), pkg2_offset, &mut container)?;
        container.truncate(size);
        env.console.ok("Loaded pkg2.");

        let view = decrypt(env.se.as_mut(), desc.version, &mut container)?;

        if patched {
            let mut directory = KipDirectory::parse(&container[view.ini1_range()])?;
            for kip in &ctx.kips {
                directory.merge(kip)?;
            }

            let kernel = match ctx.kernel_override.take() {
                Some(kernel) => kernel,
                None => {
                    let mut kernel = container[view.kernel_range()].to_vec();
                    if let Some(patchset) = desc.kernel_patchset {
                        let entries = patchset.entries();
                        let mut selected: Vec<PatchEntry> = Vec::new();
                        if ctx.fullsvcperm {
                            selected.extend(entries.first());
                        }
                        if ctx.debugmode {
                            selected.extend(entries.get(1));
                        }
                        apply_entries_to_slice(&selected, &mut kernel)?;
                    }
                    kernel
                }
            };

            build_encrypt(
                env.se.as_mut(),
                env.mem.as_mut(),
                desc.version,
                PKG2_LOAD_ADDR,
                &kernel,
                &directory,
                &view.header.sec_ctr,
            )?;
            env.console.ok("Rebuilt and encrypted pkg2.");
        } else {
            env.mem.write_bytes(PKG2_LOAD_ADDR, &container)?;
        }
        self.state = LaunchState::Pkg2Ready;

        // Scrub what the monitor must not see, then lock the engine. The
        // lock is the last engine operation this run.
        env.se.clear_key(KeySlot::Slot8)?;
        env.se.clear_key(KeySlot::Slot11)?;
        env.se.set_key_access(KeySlot::Slot12, KeyAccess::DISABLED)?;
        env.se.set_key_access(KeySlot::Slot15, KeyAccess::DISABLED)?;
        env.mem.fill(BOOTCFG_ADDR, BOOTCFG_SIZE, 0)?;
        env.se.lock_all()?;

        self.state = LaunchState::HandshakeStarted;
        run_handshake(
            env.doorbell.as_mut(),
            env.cluster.as_mut(),
            desc.secmon_base,
            desc.version,
        );
        self.state = LaunchState::Halted;
        Ok(())
    }
}

/// Run one launch attempt.
pub fn launch(env: &mut BootEnv, hen: bool) -> SwitchbootResult<LaunchState> {
    let mut launcher = Launcher::new();
    launcher.run(env, hen)?;
    Ok(launcher.state())
}
