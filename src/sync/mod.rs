// src/sync/mod.rs

// Declare sub-modules for status monitoring
pub mod activity;
pub mod api;
pub mod http;
pub mod monitor;
pub mod process;
pub mod signals;
pub mod status;

pub use monitor::Monitor;
pub use status::SyncState;
