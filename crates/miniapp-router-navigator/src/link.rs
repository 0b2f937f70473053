//! Router links.
//!
//! A [`RouterLink`] wires a clickable element to the router: it computes the
//! `href` to render and performs the navigation on activation.
//!
//! ```
//! use miniapp_router_core::{NavigationUpdate, RouterConfig, RoutingTree};
//! use miniapp_router_history::MemoryNativeHistory;
//! use miniapp_router_navigator::{LinkElement, Router, RouterLink};
//!
//! let tree = RoutingTree::builder().view("main", ["home", "settings"]).build().unwrap();
//! let router = Router::builder(RouterConfig::new(tree), MemoryNativeHistory::new("#/main/home"))
//! 	.build()
//! 	.unwrap();
//! router.mount().unwrap();
//!
//! let link = RouterLink::to(router.navigator(), NavigationUpdate::for_panel("settings"));
//! assert_eq!(link.href(&LinkElement::Anchor).as_deref(), Some("/main/settings"));
//! assert_eq!(link.href(&LinkElement::Plain), None);
//! ```

use crate::context::Navigator;
use crate::error::{NavigationOutcome, RouterError};
use miniapp_router_core::NavigationUpdate;

/// Where a link navigates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
	/// Push the state built from an update.
	To(NavigationUpdate),
	/// Go back one entry.
	Pop,
}

/// Kind of element a link is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkElement {
	/// An `<a>` element.
	Anchor,
	/// Any other element that already carries an `href`.
	WithHref,
	/// Any other element.
	Plain,
}

/// Default action of the activating event.
pub trait LinkEvent {
	/// Prevents the browser from following the element.
	fn prevent_default(&self);
}

#[cfg(target_arch = "wasm32")]
impl LinkEvent for web_sys::Event {
	fn prevent_default(&self) {
		web_sys::Event::prevent_default(self);
	}
}

#[cfg(target_arch = "wasm32")]
impl LinkEvent for web_sys::MouseEvent {
	fn prevent_default(&self) {
		web_sys::Event::prevent_default(self);
	}
}

/// Link bound to a navigator.
#[derive(Debug, Clone)]
pub struct RouterLink {
	navigator: Navigator,
	target: LinkTarget,
}

impl RouterLink {
	/// Link pushing the state built from `update`.
	pub fn to(navigator: Navigator, update: NavigationUpdate) -> Self {
		Self {
			navigator,
			target: LinkTarget::To(update),
		}
	}

	/// Link going back one entry.
	pub fn pop(navigator: Navigator) -> Self {
		Self {
			navigator,
			target: LinkTarget::Pop,
		}
	}

	/// Target of the link.
	pub fn target(&self) -> &LinkTarget {
		&self.target
	}

	/// `href` to render on the element.
	///
	/// Only anchors and elements that already carry an `href` get one. A pop
	/// link points at the previous state and has no `href` at the first entry.
	pub fn href(&self, element: &LinkElement) -> Option<String> {
		if *element == LinkElement::Plain {
			return None;
		}
		match &self.target {
			LinkTarget::To(update) => Some(self.navigator.create_href(update)),
			LinkTarget::Pop => self
				.navigator
				.previous_state()
				.map(|state| self.navigator.create_href(&NavigationUpdate::from(state))),
		}
	}

	/// Handles a click: prevents the default browser navigation, then pushes
	/// or goes back.
	pub fn activate(&self, event: &impl LinkEvent) -> Result<NavigationOutcome, RouterError> {
		event.prevent_default();
		match &self.target {
			LinkTarget::To(update) => self.navigator.push_state(update),
			LinkTarget::Pop => self.navigator.go_back(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::controller::Router;
	use miniapp_router_core::{NavigationState, RouterConfig, RoutingTree};
	use miniapp_router_history::{MemoryNativeHistory, NativeCall};
	use rstest::{fixture, rstest};
	use std::cell::Cell;

	#[derive(Default)]
	struct Click {
		prevented: Cell<bool>,
	}

	impl LinkEvent for Click {
		fn prevent_default(&self) {
			self.prevented.set(true);
		}
	}

	#[fixture]
	fn mounted() -> (Router, MemoryNativeHistory) {
		let tree = RoutingTree::builder()
			.view("main", ["home", "settings"])
			.popup("confirm")
			.build()
			.unwrap();
		let native = MemoryNativeHistory::new("#/main/home");
		let router = Router::builder(RouterConfig::new(tree), native.clone())
			.build()
			.unwrap();
		router.mount().unwrap();
		(router, native)
	}

	#[rstest]
	#[case(LinkElement::Anchor, Some("/main/settings?tab=2"))]
	#[case(LinkElement::WithHref, Some("/main/settings?tab=2"))]
	#[case(LinkElement::Plain, None)]
	fn test_to_href(
		mounted: (Router, MemoryNativeHistory),
		#[case] element: LinkElement,
		#[case] expected: Option<&str>,
	) {
		let (router, _native) = mounted;
		let link = RouterLink::to(
			router.navigator(),
			NavigationUpdate::for_panel("settings").with_param("tab", "2"),
		);

		assert_eq!(link.href(&element).as_deref(), expected);
	}

	#[rstest]
	fn test_pop_href_follows_previous_state(mounted: (Router, MemoryNativeHistory)) {
		let (router, _native) = mounted;
		let navigator = router.navigator();
		let link = RouterLink::pop(navigator.clone());
		assert_eq!(link.href(&LinkElement::Anchor), None);

		navigator
			.push_state(&NavigationUpdate::for_popup("confirm"))
			.unwrap();

		assert_eq!(link.href(&LinkElement::Anchor).as_deref(), Some("/main/home"));
	}

	#[rstest]
	fn test_activate_to_pushes(mounted: (Router, MemoryNativeHistory)) {
		let (router, native) = mounted;
		let link = RouterLink::to(router.navigator(), NavigationUpdate::for_panel("settings"));
		let click = Click::default();

		let outcome = link.activate(&click).unwrap();

		assert!(click.prevented.get());
		assert!(outcome.is_applied());
		assert_eq!(
			router.navigator().current_state(),
			NavigationState::new("main", "settings").with_index(1)
		);
		assert_eq!(
			native.calls(),
			[NativeCall::Push {
				url: "/main/settings".to_string(),
				index: 1,
			}]
		);
	}

	#[rstest]
	fn test_activate_pop_goes_back(mounted: (Router, MemoryNativeHistory)) {
		let (router, native) = mounted;
		let navigator = router.navigator();
		navigator
			.push_state(&NavigationUpdate::for_panel("settings"))
			.unwrap();
		let click = Click::default();

		let outcome = RouterLink::pop(navigator.clone()).activate(&click).unwrap();

		assert!(click.prevented.get());
		assert!(outcome.is_applied());
		assert_eq!(navigator.index(), 0);
		assert_eq!(native.calls().last(), Some(&NativeCall::Back));
	}

	#[rstest]
	fn test_activate_prevents_default_even_when_rejected(mounted: (Router, MemoryNativeHistory)) {
		let (router, _native) = mounted;
		let click = Click::default();

		let outcome = RouterLink::pop(router.navigator()).activate(&click).unwrap();

		assert!(click.prevented.get());
		assert!(!outcome.is_applied());
	}
}
