//! Router errors and action outcomes.

use miniapp_router_core::NavigationState;
use miniapp_router_history::NativeHistoryError;
use thiserror::Error;

/// Fatal router errors.
///
/// Construction failures and native history failures end up here.
/// Recoverable rejections of actions are reported as
/// [`NavigationOutcome::Rejected`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
	/// Initial history contains states outside the routing tree.
	#[error(
		"router initial history is corrupted. These states are invalid: {}",
		pretty_states(.0)
	)]
	CorruptedInitialHistory(Vec<NavigationState>),

	/// No initial history and the native location does not resolve to a
	/// valid state.
	#[error("there are no initial states while creating history (location hash: '{hash}')")]
	MissingInitialState {
		/// Location hash that was read.
		hash: String,
	},

	/// `mount` called on a mounted router.
	#[error("router is already mounted")]
	AlreadyMounted,

	/// `mount` called after `unmount`.
	#[error("router was unmounted and cannot be mounted again")]
	Unmounted,

	/// The native history rejected a call.
	#[error(transparent)]
	Native(#[from] NativeHistoryError),
}

fn pretty_states(states: &[NavigationState]) -> String {
	serde_json::to_string_pretty(states).unwrap_or_else(|_| format!("{:?}", states))
}

/// Why an action was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
	/// The target state is not a node of the routing tree.
	InvalidState(NavigationState),
	/// `go_back` at the first entry.
	HistoryFloor,
	/// The router is not mounted.
	Detached,
}

/// Result of a navigation action that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
	/// Memory and native histories were updated.
	Applied,
	/// Nothing changed; a warning was logged.
	Rejected(Rejection),
}

impl NavigationOutcome {
	/// Returns `true` if the action was applied.
	pub fn is_applied(&self) -> bool {
		matches!(self, Self::Applied)
	}

	/// Returns the rejection, if any.
	pub fn rejection(&self) -> Option<&Rejection> {
		match self {
			Self::Applied => None,
			Self::Rejected(rejection) => Some(rejection),
		}
	}
}
