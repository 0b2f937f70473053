//! Navigation context and navigator handle.

use crate::controller::{Lifecycle, RouterShared};
use crate::error::{NavigationOutcome, RouterError};
use miniapp_router_core::{Location, NavigationState, NavigationUpdate, RoutingTree};
use miniapp_router_history::{HistoryEntry, Subscription};
use std::fmt;
use std::rc::Rc;

/// Snapshot of where the user is, refreshed on every history change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
	/// Location of the current entry.
	pub location: Location,
	/// State of the current entry.
	pub current_state: NavigationState,
	/// State of the entry before the current one, `None` at the first entry.
	pub previous_state: Option<NavigationState>,
}

/// Handle exposing the navigation context and actions of a router.
///
/// Handles are cheap to clone and are passed explicitly to whatever needs to
/// navigate. A handle that outlives its [`Router`](crate::Router) keeps
/// answering reads, while its actions are rejected as detached.
#[derive(Clone)]
pub struct Navigator {
	shared: Rc<RouterShared>,
}

impl Navigator {
	pub(crate) fn new(shared: Rc<RouterShared>) -> Self {
		Self { shared }
	}

	/// Snapshot of the whole context.
	pub fn context(&self) -> NavigationContext {
		self.shared.context()
	}

	/// Current location.
	pub fn location(&self) -> Location {
		self.shared.context().location
	}

	/// Current state.
	pub fn current_state(&self) -> NavigationState {
		self.shared.context().current_state
	}

	/// Previous state, `None` at the first entry.
	pub fn previous_state(&self) -> Option<NavigationState> {
		self.shared.context().previous_state
	}

	/// Routing tree the router validates against.
	pub fn tree(&self) -> &RoutingTree {
		self.shared.tree()
	}

	/// Whether actions validate by default.
	pub fn validates_by_default(&self) -> bool {
		self.shared.validates_by_default()
	}

	/// Lifecycle phase of the owning router.
	pub fn lifecycle(&self) -> Lifecycle {
		self.shared.lifecycle()
	}

	/// Snapshot of the memory history entries.
	pub fn entries(&self) -> Vec<HistoryEntry> {
		self.shared.entries()
	}

	/// Position of the current entry in the memory history.
	pub fn index(&self) -> usize {
		self.shared.index()
	}

	/// Returns `true` if [`go_back`](Self::go_back) would move.
	pub fn can_go_back(&self) -> bool {
		self.shared.index() > 0
	}

	/// Pushes the state built from `update`, validating by default.
	///
	/// The new state is built from the current one with index `cursor + 1`.
	/// An invalid state is logged and rejected without touching any history.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Native`] if the native history rejects the
	/// push; the memory history is then left untouched.
	pub fn push_state(&self, update: &NavigationUpdate) -> Result<NavigationOutcome, RouterError> {
		self.shared.push_state(update, self.shared.validates_by_default())
	}

	/// Like [`push_state`](Self::push_state) with an explicit validation flag.
	pub fn push_state_with(
		&self,
		update: &NavigationUpdate,
		validate: bool,
	) -> Result<NavigationOutcome, RouterError> {
		self.shared.push_state(update, validate)
	}

	/// Replaces the current entry with the state built from `update`.
	///
	/// Same contract as [`push_state`](Self::push_state); the index is kept.
	pub fn replace_state(&self, update: &NavigationUpdate) -> Result<NavigationOutcome, RouterError> {
		self.shared.replace_state(update, self.shared.validates_by_default())
	}

	/// Like [`replace_state`](Self::replace_state) with an explicit validation flag.
	pub fn replace_state_with(
		&self,
		update: &NavigationUpdate,
		validate: bool,
	) -> Result<NavigationOutcome, RouterError> {
		self.shared.replace_state(update, validate)
	}

	/// Goes back one entry in memory and native histories.
	///
	/// At the first entry this logs a warning and does nothing; the native
	/// history is not touched.
	pub fn go_back(&self) -> Result<NavigationOutcome, RouterError> {
		self.shared.go_back()
	}

	/// URL of the state built from `update`, without navigating.
	///
	/// The state is not validated.
	pub fn create_href(&self, update: &NavigationUpdate) -> String {
		self.shared.create_href(update)
	}

	/// Calls `observer` with the new context whenever it changes.
	pub fn subscribe(&self, observer: impl Fn(&NavigationContext) + 'static) -> Subscription {
		self.shared.subscribe(observer)
	}
}

impl fmt::Debug for Navigator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Navigator")
			.field("context", &self.shared.context())
			.field("lifecycle", &self.shared.lifecycle())
			.finish()
	}
}
