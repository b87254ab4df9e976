// Library surface: the anxiety state engine plus the host-shell plumbing.
// The binary in main.rs is a thin consumer; keep engine logic out of it.
pub mod activity;
pub mod anxiety;
pub mod clock;
pub mod config;
pub mod document;
pub mod engine;
pub mod heartbeat;
pub mod runtime;
pub mod ui;
pub mod util;

/// Frame cadence of the host shell, in milliseconds.
pub const TICK_RATE_MS: u64 = 100;
