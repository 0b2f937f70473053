//! Error types for native history and host bridge calls.

use thiserror::Error;

/// Errors raised by a [`NativeHistory`](crate::NativeHistory) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeHistoryError {
	/// The native history API cannot be reached (no window, no history).
	#[error("native history is unavailable: {0}")]
	Unavailable(String),

	/// The native API threw.
	#[error("native history call failed: {0}")]
	Js(String),

	/// A navigation state could not be converted to or from its native form.
	#[error("failed to convert navigation state: {0}")]
	State(String),
}

/// Errors raised by a [`HostBridge`](crate::HostBridge) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
	/// The host bridge cannot be reached.
	#[error("host bridge is unavailable: {0}")]
	Unavailable(String),

	/// The bridge call threw or was rejected.
	#[error("host bridge call '{method}' failed: {message}")]
	Call {
		/// Bridge method name.
		method: String,
		/// Error reported by the bridge.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(NativeHistoryError::Unavailable("no window".into()), "native history is unavailable: no window")]
	#[case(NativeHistoryError::Js("SecurityError".into()), "native history call failed: SecurityError")]
	#[case(NativeHistoryError::State("bad".into()), "failed to convert navigation state: bad")]
	fn test_native_error_display(#[case] error: NativeHistoryError, #[case] expected: &str) {
		assert_eq!(error.to_string(), expected);
	}

	#[rstest]
	fn test_bridge_error_display() {
		let error = BridgeError::Call {
			method: "VKWebAppSetLocation".to_string(),
			message: "timeout".to_string(),
		};

		assert_eq!(
			error.to_string(),
			"host bridge call 'VKWebAppSetLocation' failed: timeout"
		);
	}
}
