// Constants for the simulator

/// Address of the first heap object
/// Heap addresses start at 0x1000 so they read clearly in rendered frames
pub const HEAP_ADDRESS_START: u64 = 0x1000;

/// Distance between consecutively allocated objects
pub const HEAP_ADDRESS_STRIDE: u64 = 0x10;

/// Default snapshot history limit (1 GB)
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 1024 * 1024 * 1024;

/// Default number of transitions `Simulator::run` performs before giving up
pub const DEFAULT_MAX_STEPS: usize = 100_000;
