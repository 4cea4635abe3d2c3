//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input mapping (keys, taps, buttons)
//! - Storage (LocalStorage on web, in-memory elsewhere)

pub mod input;
pub mod storage;

pub use input::{action_for_key, action_for_tap, wants_touch_controls};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
