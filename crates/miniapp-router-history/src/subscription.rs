//! Listener subscriptions.

use std::fmt;

/// Handle to a registered listener.
///
/// The listener stays registered while the handle is alive. Dropping the
/// handle, or calling [`unsubscribe`](Self::unsubscribe), removes it.
#[must_use = "dropping a Subscription unregisters the listener immediately"]
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	/// Creates a subscription that runs `cancel` once when released.
	pub fn new(cancel: impl FnOnce() + 'static) -> Self {
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}

	/// Unregisters the listener.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	fn release(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.cancel.is_some())
			.finish()
	}
}
