//! Host bridge capability.
//!
//! The host container keeps its own notion of the current location and must
//! be told about every change. Notifications are fire-and-forget: callers
//! log failures and carry on.

use crate::error::BridgeError;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Default bridge method used to report the current location.
pub const SET_LOCATION_METHOD: &str = "VKWebAppSetLocation";

/// Notifies the host container of location changes.
pub trait HostBridge {
	/// Reports the current location (an encoded router URL).
	fn notify_location(&self, location: &str) -> Result<(), BridgeError>;
}

/// Bridge that drops every notification, for hosts without a container.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBridge;

impl HostBridge for NoopBridge {
	fn notify_location(&self, _location: &str) -> Result<(), BridgeError> {
		Ok(())
	}
}

/// Bridge that records notified locations.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
	locations: Rc<RefCell<Vec<String>>>,
	failing: Rc<Cell<bool>>,
}

impl RecordingBridge {
	/// Creates an empty recording bridge.
	pub fn new() -> Self {
		Self::default()
	}

	/// Locations notified so far, oldest first. Failed calls are not recorded.
	pub fn locations(&self) -> Vec<String> {
		self.locations.borrow().clone()
	}

	/// Last notified location.
	pub fn last(&self) -> Option<String> {
		self.locations.borrow().last().cloned()
	}

	/// Forgets recorded locations.
	pub fn clear(&self) {
		self.locations.borrow_mut().clear();
	}

	/// Makes subsequent notifications fail.
	pub fn set_failing(&self, failing: bool) {
		self.failing.set(failing);
	}
}

impl HostBridge for RecordingBridge {
	fn notify_location(&self, location: &str) -> Result<(), BridgeError> {
		if self.failing.get() {
			return Err(BridgeError::Call {
				method: SET_LOCATION_METHOD.to_string(),
				message: "recording bridge is failing".to_string(),
			});
		}
		self.locations.borrow_mut().push(location.to_string());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_recording_bridge_shares_record_between_clones() {
		let bridge = RecordingBridge::new();
		let handle = bridge.clone();

		bridge.notify_location("/main/home").unwrap();
		bridge.notify_location("/main/settings").unwrap();

		assert_eq!(handle.locations(), ["/main/home", "/main/settings"]);
		assert_eq!(handle.last().as_deref(), Some("/main/settings"));
	}

	#[rstest]
	fn test_recording_bridge_failure() {
		let bridge = RecordingBridge::new();
		bridge.set_failing(true);

		let result = bridge.notify_location("/main/home");

		assert!(matches!(result, Err(BridgeError::Call { .. })));
		assert!(bridge.locations().is_empty());
	}

	#[rstest]
	fn test_noop_bridge_accepts_everything() {
		assert!(NoopBridge.notify_location("/anything").is_ok());
	}
}
