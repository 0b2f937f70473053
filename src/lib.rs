//! # miniapp-router
//!
//! Client-side router for mini apps hosted in a web-view container.
//!
//! The router keeps an in-memory navigation history as the system of record
//! and synchronizes it with the browser history and the host container.
//! Navigation targets are `(view, panel, popup, query)` states validated
//! against a declared routing tree.
//!
//! ## Crates
//!
//! - `miniapp-router-core`: routing tree, navigation state, URL and query
//!   codecs, state builder, configuration
//! - `miniapp-router-history`: memory history, native history capability,
//!   host bridge capability
//! - `miniapp-router-navigator`: synchronization controller, navigation
//!   context, links
//!
//! ## Quick Example
//!
//! ```
//! use miniapp_router::prelude::*;
//!
//! let config = RouterConfig::from_toml_str(r#"
//! 	[tree]
//! 	views = { main = ["home", "settings"] }
//! 	popups = ["confirm"]
//! "#).unwrap();
//!
//! let native = MemoryNativeHistory::new("#/main/home");
//! let router = start(config, native.clone(), NoopBridge).unwrap();
//! let navigator = router.navigator();
//!
//! navigator.push_state(&NavigationUpdate::for_panel("settings")).unwrap();
//! assert_eq!(navigator.location().pathname, "/main/settings");
//!
//! // the user presses back
//! native.pop(-1);
//! assert_eq!(navigator.current_state().panel, "home");
//! ```
//!
//! ## Browser
//!
//! On `wasm32` targets `start_in_browser` wires the router to
//! `window.history` and to the `vkBridge` host bridge.

// Re-export main types for convenience
pub use miniapp_router_core::{
	ConfigError, Location, NavigationState, NavigationUpdate, NestedQueryCodec, Query, QueryCodec,
	QueryValue, RouterConfig, RoutingTree, RoutingTreeBuilder, TreeError, build_state, decode,
	encode, is_valid, parse_query, stringify_query,
};
pub use miniapp_router_history::{
	BridgeError, HistoryEntry, HostBridge, MemoryHistory, MemoryNativeHistory, NativeHistory,
	NativeHistoryError, NoopBridge, PopStateEvent, RecordingBridge, Subscription,
};
pub use miniapp_router_navigator::{
	LinkElement, LinkEvent, LinkTarget, Lifecycle, NavigationContext, NavigationOutcome, Navigator,
	Rejection, Router, RouterBuilder, RouterError, RouterLink,
};

#[cfg(target_arch = "wasm32")]
pub use miniapp_router_history::{BrowserHistory, VkBridge};

/// Builds a router and mounts it.
///
/// # Errors
///
/// Returns the construction error of [`RouterBuilder::build`] or the mount
/// error of [`Router::mount`].
pub fn start(
	config: RouterConfig,
	native: impl NativeHistory + 'static,
	bridge: impl HostBridge + 'static,
) -> Result<Router, RouterError> {
	let router = Router::new(config, native, bridge)?;
	router.mount()?;
	tracing::info!(location = %router.navigator().location(), "router started");
	Ok(router)
}

/// Builds a router over `window.history` reporting to `vkBridge`, and
/// mounts it.
///
/// # Errors
///
/// Fails when there is no `window`, or as [`start`] does.
#[cfg(target_arch = "wasm32")]
pub fn start_in_browser(config: RouterConfig) -> Result<Router, RouterError> {
	start(config, BrowserHistory::new()?, VkBridge::new())
}

/// Convenient imports for applications.
pub mod prelude {
	pub use crate::{
		Lifecycle, LinkElement, NavigationContext, NavigationOutcome, NavigationState,
		NavigationUpdate, Navigator, Query, QueryValue, Rejection, Router, RouterConfig,
		RouterError, RouterLink, RoutingTree, start,
	};

	pub use crate::{MemoryNativeHistory, NativeHistory, NoopBridge, RecordingBridge};

	#[cfg(target_arch = "wasm32")]
	pub use crate::{BrowserHistory, VkBridge, start_in_browser};
}
