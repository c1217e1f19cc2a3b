//! Central configuration constants for runtime limits and defaults.

/// Default planning backend base URL.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Path of the streaming plan endpoint, relative to the server URL.
pub const PLAN_ENDPOINT: &str = "/api/plan";

/// Liveness probe used by `connect`.
pub const HEALTH_ENDPOINT: &str = "/health";

/// Per-request timeout for the liveness probe, in seconds.
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// How long the CLI waits for a live plan before cancelling it, in seconds.
pub const PLAN_TIMEOUT_SECS: u64 = 300;

/// Capacity of the kernel's inbound event queue.
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Number of specialist agents a full plan fans out to.
pub const SPECIALIST_AGENT_COUNT: usize = 4;

/// Title used when a JSON item carries none.
pub const PLACEHOLDER_TITLE: &str = "Untitled";

/// Description used when a JSON item carries none.
pub const PLACEHOLDER_DESCRIPTION: &str = "No description provided";

/// Longest free-text label derived from streamed reasoning.
pub const MAX_LABEL_CHARS: usize = 80;

/// Clamp a display percentage into 0..=100.
pub fn clamp_percent(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 100.0).round() as u8
}
