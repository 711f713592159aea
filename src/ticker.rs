use std::time::Duration;

/// Default tick interval in milliseconds. The countdown displays whole seconds,
/// so four ticks per second keeps it from skipping a digit.
pub const DEFAULT_TICK_MS: u64 = 250;

/// Get tick duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

/// Interval between relay reminder sweeps
pub fn sweep_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}
