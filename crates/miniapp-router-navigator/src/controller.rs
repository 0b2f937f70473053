//! History synchronization controller.
//!
//! A [`Router`] keeps three layers consistent:
//!
//! 1. the [`MemoryHistory`], which is the system of record
//! 2. the platform history behind [`NativeHistory`]
//! 3. the host container, told about every location through [`HostBridge`]
//!
//! ## Lifecycle
//!
//! `Uninitialized -> Mounted -> Unmounted`, without resurrection.
//!
//! Construction resolves the initial memory history. [`Router::mount`]
//! replays entries `1..=cursor` into the native history (entry 0 is the
//! floor the application was loaded on and is never pushed), notifies the
//! host once and starts listening for `popstate`. [`Router::unmount`] stops
//! listening and rewinds the native history by the cursor, leaving it as it
//! was found. Dropping a mounted router unmounts it.
//!
//! The router assumes sole ownership of the native history while mounted.
//!
//! ## Example
//!
//! ```
//! use miniapp_router_core::{NavigationUpdate, RouterConfig, RoutingTree};
//! use miniapp_router_history::{MemoryNativeHistory, NativeHistory, RecordingBridge};
//! use miniapp_router_navigator::Router;
//!
//! let tree = RoutingTree::builder()
//! 	.view("main", ["home"])
//! 	.popup("confirm")
//! 	.build()
//! 	.unwrap();
//! let native = MemoryNativeHistory::new("#/main/home");
//!
//! let router = Router::builder(RouterConfig::new(tree), native.clone())
//! 	.bridge(RecordingBridge::new())
//! 	.build()
//! 	.unwrap();
//! router.mount().unwrap();
//!
//! let navigator = router.navigator();
//! navigator.push_state(&NavigationUpdate::for_popup("confirm")).unwrap();
//! assert_eq!(navigator.location().pathname, "/main/home/confirm");
//! assert_eq!(native.location_hash().unwrap(), "#/main/home/confirm");
//! ```

use crate::context::{NavigationContext, Navigator};
use crate::error::{NavigationOutcome, Rejection, RouterError};
use crate::reconcile::pop_state_delta;
use miniapp_router_core::{
	Location, NavigationState, NavigationUpdate, NestedQueryCodec, QueryCodec, RouterConfig,
	RoutingTree, build_state, decode_with, encode_with, is_valid, normalize_with,
};
use miniapp_router_history::{
	HistoryEntry, HostBridge, MemoryHistory, NativeHistory, NoopBridge, PopStateEvent, Subscription,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Lifecycle phase of a [`Router`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
	/// Constructed, not yet mounted.
	Uninitialized,
	/// Synchronizing with the native history.
	Mounted,
	/// Detached for good.
	Unmounted,
}

type Observer = Rc<dyn Fn(&NavigationContext)>;

/// State shared between a [`Router`] and its [`Navigator`] handles.
pub(crate) struct RouterShared {
	tree: RoutingTree,
	validate: bool,
	history: MemoryHistory,
	native: Rc<dyn NativeHistory>,
	bridge: Rc<dyn HostBridge>,
	query_codec: Rc<dyn QueryCodec>,
	lifecycle: Cell<Lifecycle>,
	context: RefCell<NavigationContext>,
	observers: RefCell<Vec<(u64, Observer)>>,
	next_observer_id: Cell<u64>,
	subscriptions: RefCell<Vec<Subscription>>,
}

impl RouterShared {
	pub(crate) fn tree(&self) -> &RoutingTree {
		&self.tree
	}

	pub(crate) fn validates_by_default(&self) -> bool {
		self.validate
	}

	pub(crate) fn lifecycle(&self) -> Lifecycle {
		self.lifecycle.get()
	}

	pub(crate) fn context(&self) -> NavigationContext {
		self.context.borrow().clone()
	}

	pub(crate) fn entries(&self) -> Vec<HistoryEntry> {
		self.history.entries()
	}

	pub(crate) fn index(&self) -> usize {
		self.history.index()
	}

	fn is_mounted(&self) -> bool {
		self.lifecycle.get() == Lifecycle::Mounted
	}

	fn encode(&self, state: &NavigationState) -> String {
		encode_with(self.query_codec.as_ref(), state)
	}

	/// Builds the next state with its query in URL form, so that the stored
	/// state is the one a reload decodes.
	fn build(&self, update: &NavigationUpdate, explicit_index: Option<usize>) -> NavigationState {
		let current = self.history.current();
		normalize_with(
			self.query_codec.as_ref(),
			&build_state(&current.state, update, explicit_index),
		)
	}

	fn detached(&self, action: &str) -> NavigationOutcome {
		tracing::warn!(action, lifecycle = ?self.lifecycle.get(), "navigation skipped because the router is not mounted");
		NavigationOutcome::Rejected(Rejection::Detached)
	}

	fn reject_invalid(&self, action: &str, update: &NavigationUpdate, state: NavigationState) -> NavigationOutcome {
		tracing::warn!(
			action,
			?update,
			?state,
			tree = ?self.tree,
			"navigation skipped because the state is not in the routing tree"
		);
		NavigationOutcome::Rejected(Rejection::InvalidState(state))
	}

	pub(crate) fn push_state(
		&self,
		update: &NavigationUpdate,
		validate: bool,
	) -> Result<NavigationOutcome, RouterError> {
		if !self.is_mounted() {
			return Ok(self.detached("push_state"));
		}

		let state = self.build(update, Some(self.history.index() + 1));
		if validate && !is_valid(&state, &self.tree) {
			return Ok(self.reject_invalid("push_state", update, state));
		}

		let url = self.encode(&state);
		self.native.push_entry(&url, &state)?;
		self.history.push(url, state);
		Ok(NavigationOutcome::Applied)
	}

	pub(crate) fn replace_state(
		&self,
		update: &NavigationUpdate,
		validate: bool,
	) -> Result<NavigationOutcome, RouterError> {
		if !self.is_mounted() {
			return Ok(self.detached("replace_state"));
		}

		let state = self.build(update, None);
		if validate && !is_valid(&state, &self.tree) {
			return Ok(self.reject_invalid("replace_state", update, state));
		}

		let url = self.encode(&state);
		self.native.replace_entry(&url, &state)?;
		self.history.replace(url, state);
		Ok(NavigationOutcome::Applied)
	}

	pub(crate) fn go_back(&self) -> Result<NavigationOutcome, RouterError> {
		if !self.is_mounted() {
			return Ok(self.detached("go_back"));
		}

		if self.history.index() == 0 {
			tracing::warn!("go_back skipped because the current location is the first one in history");
			return Ok(NavigationOutcome::Rejected(Rejection::HistoryFloor));
		}

		self.native.back()?;
		self.history.go_back();
		Ok(NavigationOutcome::Applied)
	}

	pub(crate) fn create_href(&self, update: &NavigationUpdate) -> String {
		self.encode(&self.build(update, None))
	}

	pub(crate) fn subscribe(self: &Rc<Self>, observer: impl Fn(&NavigationContext) + 'static) -> Subscription {
		let id = self.next_observer_id.get();
		self.next_observer_id.set(id + 1);
		self.observers.borrow_mut().push((id, Rc::new(observer)));

		let weak = Rc::downgrade(self);
		Subscription::new(move || {
			if let Some(shared) = weak.upgrade() {
				shared
					.observers
					.borrow_mut()
					.retain(|(observer_id, _)| *observer_id != id);
			}
		})
	}

	/// Memory history listener: refreshes the context, notifies the host and
	/// the observers.
	fn on_stack_change(&self, location: &Location, state: &NavigationState) {
		let previous_state = state
			.index
			.checked_sub(1)
			.and_then(|index| self.history.entry(index))
			.map(|entry| entry.state);

		let changed = {
			let mut context = self.context.borrow_mut();
			let next = NavigationContext {
				location: location.clone(),
				current_state: state.clone(),
				previous_state,
			};
			if *context == next {
				false
			} else {
				*context = next;
				true
			}
		};

		self.notify_host(&location.href());

		if changed {
			let snapshot = self.context();
			let observers: Vec<Observer> = self
				.observers
				.borrow()
				.iter()
				.map(|(_, observer)| Rc::clone(observer))
				.collect();
			for observer in observers {
				observer(&snapshot);
			}
		}
	}

	/// Native `popstate` handler. Moves the memory cursor only.
	fn on_pop_state(&self, event: &PopStateEvent) {
		let delta = pop_state_delta(event, self.history.index());
		tracing::debug!(delta, "reconciling popstate");
		if delta != 0 {
			self.history.go(delta);
		}
	}

	fn notify_host(&self, location: &str) {
		if let Err(error) = self.bridge.notify_location(location) {
			tracing::warn!(%error, location, "host bridge location notification failed");
		}
	}
}

/// Builder for [`Router`].
pub struct RouterBuilder {
	config: RouterConfig,
	native: Rc<dyn NativeHistory>,
	bridge: Rc<dyn HostBridge>,
	query_codec: Rc<dyn QueryCodec>,
}

impl RouterBuilder {
	/// Sets the host bridge. Defaults to [`NoopBridge`].
	pub fn bridge(mut self, bridge: impl HostBridge + 'static) -> Self {
		self.bridge = Rc::new(bridge);
		self
	}

	/// Sets the query-string codec. Defaults to [`NestedQueryCodec`].
	pub fn query_codec(mut self, codec: impl QueryCodec + 'static) -> Self {
		self.query_codec = Rc::new(codec);
		self
	}

	/// Resolves the initial history and creates the router.
	///
	/// # Errors
	///
	/// - [`RouterError::CorruptedInitialHistory`] when validation is enabled
	///   and initial history states are outside the tree; every invalid
	///   state is listed
	/// - [`RouterError::MissingInitialState`] when there is no initial
	///   history and the native location hash does not resolve to a state
	///   (or to a valid one, with validation enabled)
	/// - [`RouterError::Native`] when the location hash cannot be read
	pub fn build(self) -> Result<Router, RouterError> {
		let history = initial_history(&self.config, self.native.as_ref(), self.query_codec.as_ref())?;

		let current = history.current();
		let previous_state = current
			.state
			.index
			.checked_sub(1)
			.and_then(|index| history.entry(index))
			.map(|entry| entry.state);
		let context = NavigationContext {
			location: current.location(),
			current_state: current.state,
			previous_state,
		};

		let RouterConfig { tree, validate, .. } = self.config;
		Ok(Router {
			shared: Rc::new(RouterShared {
				tree,
				validate,
				history,
				native: self.native,
				bridge: self.bridge,
				query_codec: self.query_codec,
				lifecycle: Cell::new(Lifecycle::Uninitialized),
				context: RefCell::new(context),
				observers: RefCell::new(Vec::new()),
				next_observer_id: Cell::new(0),
				subscriptions: RefCell::new(Vec::new()),
			}),
		})
	}
}

fn initial_history(
	config: &RouterConfig,
	native: &dyn NativeHistory,
	codec: &dyn QueryCodec,
) -> Result<MemoryHistory, RouterError> {
	let mut states = config.initial_history.iter();
	let Some(first) = states.next() else {
		let hash = native.location_hash()?;
		let state = decode_with(codec, &hash)
			.filter(|state| !config.validate || is_valid(state, &config.tree))
			.ok_or(RouterError::MissingInitialState { hash })?;
		return Ok(MemoryHistory::new(encode_with(codec, &state), state));
	};

	if config.validate {
		let invalid: Vec<NavigationState> = config
			.initial_history
			.iter()
			.filter(|state| !is_valid(state, &config.tree))
			.cloned()
			.collect();
		if !invalid.is_empty() {
			return Err(RouterError::CorruptedInitialHistory(invalid));
		}
	}

	let first = normalize_with(codec, first);
	let history = MemoryHistory::new(encode_with(codec, &first), first);
	for state in states {
		let state = normalize_with(codec, state);
		history.push(encode_with(codec, &state), state);
	}
	Ok(history)
}

/// History synchronization controller.
///
/// The router owns the synchronization; [`Navigator`] handles obtained from
/// [`navigator`](Self::navigator) expose the navigation context and actions.
pub struct Router {
	shared: Rc<RouterShared>,
}

impl Router {
	/// Starts building a router over a native history.
	pub fn builder(config: RouterConfig, native: impl NativeHistory + 'static) -> RouterBuilder {
		RouterBuilder {
			config,
			native: Rc::new(native),
			bridge: Rc::new(NoopBridge),
			query_codec: Rc::new(NestedQueryCodec),
		}
	}

	/// Creates a router with the default query codec.
	///
	/// See [`RouterBuilder::build`] for errors.
	pub fn new(
		config: RouterConfig,
		native: impl NativeHistory + 'static,
		bridge: impl HostBridge + 'static,
	) -> Result<Self, RouterError> {
		Self::builder(config, native).bridge(bridge).build()
	}

	/// Returns a navigation handle.
	pub fn navigator(&self) -> Navigator {
		Navigator::new(Rc::clone(&self.shared))
	}

	/// Current lifecycle phase.
	pub fn lifecycle(&self) -> Lifecycle {
		self.shared.lifecycle.get()
	}

	/// Starts synchronizing with the native history.
	///
	/// Entries `1..=cursor` are pushed to the native history in ascending
	/// order, the host is notified of the resulting location once and then
	/// the `popstate` listener is registered.
	///
	/// # Errors
	///
	/// Fails on a second mount, after unmount, or when the native history
	/// rejects a call. On native failure, entries already replayed are
	/// rewound and the router stays unmounted.
	pub fn mount(&self) -> Result<(), RouterError> {
		match self.shared.lifecycle.get() {
			Lifecycle::Uninitialized => {}
			Lifecycle::Mounted => return Err(RouterError::AlreadyMounted),
			Lifecycle::Unmounted => return Err(RouterError::Unmounted),
		}

		let shared = &self.shared;
		let weak: Weak<RouterShared> = Rc::downgrade(shared);
		let stack_subscription = shared.history.listen(move |location, state| {
			if let Some(shared) = weak.upgrade() {
				shared.on_stack_change(location, state);
			}
		});

		let entries = shared.history.entries();
		let cursor = shared.history.index();
		for (replayed, entry) in entries[1..=cursor].iter().enumerate() {
			if let Err(error) = shared.native.push_entry(&entry.url, &entry.state) {
				self.rewind(replayed);
				return Err(error.into());
			}
		}
		tracing::debug!(depth = cursor, "replayed memory history into native history");

		shared.notify_host(&entries[cursor].url);

		let weak: Weak<RouterShared> = Rc::downgrade(shared);
		let pop_subscription = match shared.native.on_pop_state(Box::new(move |event| {
			if let Some(shared) = weak.upgrade() {
				shared.on_pop_state(event);
			}
		})) {
			Ok(subscription) => subscription,
			Err(error) => {
				self.rewind(cursor);
				return Err(error.into());
			}
		};

		shared
			.subscriptions
			.borrow_mut()
			.extend([stack_subscription, pop_subscription]);
		shared.lifecycle.set(Lifecycle::Mounted);
		tracing::debug!(index = cursor, entries = entries.len(), "router mounted");
		Ok(())
	}

	/// Stops synchronizing and rewinds the native history by the cursor.
	///
	/// Listeners are unregistered before the rewind, so the resulting
	/// `popstate` is not observed. Unmounting a router that was never
	/// mounted only marks it unmounted; unmounting twice is a no-op.
	///
	/// # Errors
	///
	/// Returns the native history error if the rewind fails. The router is
	/// unmounted regardless.
	pub fn unmount(&self) -> Result<(), RouterError> {
		let previous = self.shared.lifecycle.replace(Lifecycle::Unmounted);
		if previous != Lifecycle::Mounted {
			return Ok(());
		}

		let subscriptions: Vec<Subscription> = self.shared.subscriptions.borrow_mut().drain(..).collect();
		drop(subscriptions);

		let cursor = self.shared.history.index();
		tracing::debug!(rewind = cursor, "router unmounted");
		if cursor > 0 {
			self.shared.native.go(-signed(cursor))?;
		}
		Ok(())
	}

	fn rewind(&self, pushed: usize) {
		if pushed == 0 {
			return;
		}
		if let Err(error) = self.shared.native.go(-signed(pushed)) {
			tracing::warn!(%error, pushed, "failed to rewind native history after a failed mount");
		}
	}
}

fn signed(count: usize) -> isize {
	isize::try_from(count).unwrap_or(isize::MAX)
}

impl Drop for Router {
	fn drop(&mut self) {
		if let Err(error) = self.unmount() {
			tracing::warn!(%error, "failed to unmount router on drop");
		}
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("lifecycle", &self.shared.lifecycle.get())
			.field("validate", &self.shared.validate)
			.field("history", &self.shared.history)
			.finish()
	}
}
