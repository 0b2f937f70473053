//! History layers of the mini-app router.
//!
//! - [`MemoryHistory`]: the in-memory stack, system of record for navigation
//! - [`NativeHistory`]: capability over the platform history, with the
//!   in-memory [`MemoryNativeHistory`] fake
//! - [`HostBridge`]: fire-and-forget location notifications to the host
//!   container, with [`NoopBridge`] and [`RecordingBridge`]
//!
//! On `wasm32` targets the `browser` module provides `BrowserHistory` and
//! `VkBridge`, backed by `web-sys`.

pub mod bridge;
pub mod error;
pub mod memory;
pub mod native;
pub mod subscription;

#[cfg(target_arch = "wasm32")]
pub mod browser;

// Re-export main types for convenience
pub use bridge::{HostBridge, NoopBridge, RecordingBridge, SET_LOCATION_METHOD};
pub use error::{BridgeError, NativeHistoryError};
pub use memory::{HistoryEntry, MemoryHistory};
pub use native::{MemoryNativeHistory, NativeCall, NativeHistory, PopStateEvent, PopStateHandler};
pub use subscription::Subscription;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserHistory, VkBridge};
