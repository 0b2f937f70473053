//! Router configuration.
//!
//! A configuration can be built in code or loaded from TOML / JSON:
//!
//! ```toml
//! validate = true
//!
//! [tree]
//! popups = ["confirm"]
//!
//! [tree.views]
//! main = ["home", "settings"]
//! profile = ["overview"]
//!
//! [[initial_history]]
//! view = "main"
//! panel = "home"
//! ```

use crate::ConfigResult;
use crate::error::ConfigError;
use crate::state::NavigationState;
use crate::tree::RoutingTree;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
	/// Legal locations of the application.
	pub tree: RoutingTree,

	/// States replayed into the memory history on construction.
	///
	/// When empty, the initial state is decoded from the native location.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub initial_history: Vec<NavigationState>,

	/// Whether actions validate their target against the tree by default.
	#[serde(default = "default_validate")]
	pub validate: bool,
}

fn default_validate() -> bool {
	true
}

impl RouterConfig {
	/// Creates a configuration with validation enabled and no initial history.
	pub fn new(tree: RoutingTree) -> Self {
		Self {
			tree,
			initial_history: Vec::new(),
			validate: default_validate(),
		}
	}

	/// Sets the initial history.
	pub fn with_initial_history(mut self, history: impl IntoIterator<Item = NavigationState>) -> Self {
		self.initial_history = history.into_iter().collect();
		self
	}

	/// Enables or disables validation by default.
	pub fn with_validation(mut self, validate: bool) -> Self {
		self.validate = validate;
		self
	}

	/// Load configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if the file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
			path: path.as_ref().to_path_buf(),
			source: e,
		})?;

		Self::from_toml_str(&content)
	}

	/// Parse configuration from a TOML string.
	pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Parse configuration from a JSON string.
	pub fn from_json_str(content: &str) -> ConfigResult<Self> {
		Ok(serde_json::from_str(content)?)
	}
}
