//! Routing tree and validator.
//!
//! A [`RoutingTree`] declares every legal location of the application: a map
//! from view identifiers to their panels, plus a flat set of popups that can
//! open over any panel. The tree is built once and never mutated.
//!
//! ## Example
//!
//! ```
//! use miniapp_router_core::{NavigationState, RoutingTree, is_valid};
//!
//! let tree = RoutingTree::builder()
//! 	.view("main", ["home", "settings"])
//! 	.view("profile", ["overview"])
//! 	.popup("confirm")
//! 	.build()
//! 	.unwrap();
//!
//! assert!(is_valid(&NavigationState::new("main", "home"), &tree));
//! assert!(is_valid(&NavigationState::new("main", "home").with_popup("confirm"), &tree));
//! assert!(!is_valid(&NavigationState::new("main", "overview"), &tree));
//! ```

use crate::error::{IdKind, TreeError};
use crate::state::NavigationState;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Characters that cannot appear in identifiers because identifiers become
/// URL path segments.
const RESERVED_CHARACTERS: [char; 3] = ['/', '?', '#'];

/// Static declaration of legal `(view, panel, popup)` combinations.
///
/// Invariants, enforced by [`RoutingTreeBuilder::build`] and on
/// deserialization:
///
/// - identifiers are non-empty and free of `/`, `?` and `#`
/// - every view declares at least one panel
/// - a panel identifier belongs to exactly one view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct RoutingTree {
	views: BTreeMap<String, BTreeSet<String>>,
	popups: BTreeSet<String>,
}

impl RoutingTree {
	/// Starts building a tree.
	pub fn builder() -> RoutingTreeBuilder {
		RoutingTreeBuilder::default()
	}

	/// Returns `true` if the view exists.
	pub fn has_view(&self, view: &str) -> bool {
		self.views.contains_key(view)
	}

	/// Returns `true` if the panel belongs to the view.
	pub fn has_panel(&self, view: &str, panel: &str) -> bool {
		self.views
			.get(view)
			.is_some_and(|panels| panels.contains(panel))
	}

	/// Returns `true` if the popup is registered.
	pub fn has_popup(&self, popup: &str) -> bool {
		self.popups.contains(popup)
	}

	/// Returns `true` if the combination is a node of the tree.
	///
	/// A missing popup is always accepted.
	pub fn contains(&self, view: &str, panel: &str, popup: Option<&str>) -> bool {
		self.has_panel(view, panel) && popup.is_none_or(|popup| self.has_popup(popup))
	}

	/// Iterates over view identifiers in sorted order.
	pub fn views(&self) -> impl Iterator<Item = &str> {
		self.views.keys().map(String::as_str)
	}

	/// Returns the panels of a view.
	pub fn panels(&self, view: &str) -> Option<&BTreeSet<String>> {
		self.views.get(view)
	}

	/// Returns the registered popups.
	pub fn popups(&self) -> &BTreeSet<String> {
		&self.popups
	}
}

/// Returns `true` if the state's view, panel and popup form a node of the tree.
///
/// Unknown views and unknown panels are both simply invalid; this function
/// never fails.
pub fn is_valid(state: &NavigationState, tree: &RoutingTree) -> bool {
	tree.contains(&state.view, &state.panel, state.popup.as_deref())
}

/// Builder for [`RoutingTree`].
///
/// Declaring the same view twice merges its panels.
#[derive(Debug, Default, Clone)]
pub struct RoutingTreeBuilder {
	views: Vec<(String, Vec<String>)>,
	popups: Vec<String>,
}

impl RoutingTreeBuilder {
	/// Declares a view and its panels.
	pub fn view<I, S>(mut self, id: impl Into<String>, panels: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.views
			.push((id.into(), panels.into_iter().map(Into::into).collect()));
		self
	}

	/// Registers a popup.
	pub fn popup(mut self, id: impl Into<String>) -> Self {
		self.popups.push(id.into());
		self
	}

	/// Registers several popups.
	pub fn popups<I, S>(mut self, ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.popups.extend(ids.into_iter().map(Into::into));
		self
	}

	/// Validates the declarations and builds the tree.
	///
	/// # Errors
	///
	/// Returns the first [`TreeError`] found, checking views in declaration
	/// order and popups last.
	pub fn build(self) -> Result<RoutingTree, TreeError> {
		let mut views: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
		let mut owners: BTreeMap<String, String> = BTreeMap::new();

		for (view, panels) in self.views {
			check_identifier(IdKind::View, &view)?;
			if panels.is_empty() && !views.contains_key(&view) {
				return Err(TreeError::EmptyView(view));
			}

			for panel in panels {
				check_identifier(IdKind::Panel, &panel)?;
				match owners.get(&panel) {
					Some(owner) if owner != &view => {
						return Err(TreeError::DuplicatePanel {
							panel,
							first_view: owner.clone(),
							second_view: view,
						});
					}
					Some(_) => {}
					None => {
						owners.insert(panel.clone(), view.clone());
					}
				}
				views.entry(view.clone()).or_default().insert(panel);
			}
		}

		let mut popups = BTreeSet::new();
		for popup in self.popups {
			check_identifier(IdKind::Popup, &popup)?;
			popups.insert(popup);
		}

		Ok(RoutingTree { views, popups })
	}
}

fn check_identifier(kind: IdKind, id: &str) -> Result<(), TreeError> {
	if id.is_empty() {
		return Err(TreeError::EmptyIdentifier { kind });
	}
	if let Some(character) = id.chars().find(|c| RESERVED_CHARACTERS.contains(c)) {
		return Err(TreeError::ReservedCharacter {
			kind,
			id: id.to_string(),
			character,
		});
	}
	Ok(())
}

/// Serialized form of a tree before validation.
#[derive(Deserialize)]
struct RawTree {
	views: BTreeMap<String, IdSet>,
	#[serde(default)]
	popups: IdSet,
}

/// A set of identifiers, written either as a list or as a map whose values
/// are ignored (`{ "home": false, "settings": false }`).
#[derive(Deserialize)]
#[serde(untagged)]
enum IdSet {
	List(Vec<String>),
	Map(BTreeMap<String, IgnoredAny>),
}

impl Default for IdSet {
	fn default() -> Self {
		Self::List(Vec::new())
	}
}

impl IdSet {
	fn into_ids(self) -> Vec<String> {
		match self {
			Self::List(ids) => ids,
			Self::Map(ids) => ids.into_keys().collect(),
		}
	}
}

impl TryFrom<RawTree> for RoutingTree {
	type Error = TreeError;

	fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
		let mut builder = RoutingTree::builder().popups(raw.popups.into_ids());
		for (view, panels) in raw.views {
			builder = builder.view(view, panels.into_ids());
		}
		builder.build()
	}
}
