/*++

Licensed under the Apache-2.0 license.

File Name:

    cluster.rs

Abstract:

    File contains the secondary-cluster control interface.

--*/

/// Control over the secondary execution context (the cluster the secure
/// monitor runs on) and the primary context's terminal halt.
pub trait ClusterControl {
    /// Start the secondary context at `entry_addr`. Once started it cannot
    /// be stopped short of a full hardware reset.
    fn boot_secondary(&mut self, entry_addr: u32);

    /// Park the primary context on a low-power wait. On hardware this never
    /// returns; models may return to let a test observe the terminal state.
    fn halt_primary(&mut self);
}
