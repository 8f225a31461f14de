//! Security event logging
//!
//! Append-only JSONL log of authentication and session lifecycle events.
//! Secrets never appear here: no passphrases, no share codes, no key bytes,
//! and budget ids only as short previews.

pub mod entry;
pub mod logger;

pub use entry::{SecurityEntry, SecurityEvent};
pub use logger::SecurityLog;
