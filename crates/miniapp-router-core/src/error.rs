//! Error types for routing tree construction and configuration loading.

use thiserror::Error;

/// Which kind of identifier an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
	/// A view identifier.
	View,
	/// A panel identifier.
	Panel,
	/// A popup identifier.
	Popup,
}

impl std::fmt::Display for IdKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::View => write!(f, "view"),
			Self::Panel => write!(f, "panel"),
			Self::Popup => write!(f, "popup"),
		}
	}
}

/// Errors raised while building a [`RoutingTree`](crate::RoutingTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
	/// An identifier is the empty string.
	#[error("{kind} identifier must not be empty")]
	EmptyIdentifier {
		/// Kind of the offending identifier.
		kind: IdKind,
	},

	/// An identifier contains a character reserved by the URL grammar.
	///
	/// Identifiers become path segments, so `/`, `?` and `#` are rejected.
	#[error("{kind} identifier '{id}' contains reserved character '{character}'")]
	ReservedCharacter {
		/// Kind of the offending identifier.
		kind: IdKind,
		/// The identifier.
		id: String,
		/// The reserved character found.
		character: char,
	},

	/// A panel identifier is declared under more than one view.
	#[error("panel '{panel}' is declared in both view '{first_view}' and view '{second_view}'")]
	DuplicatePanel {
		/// The panel identifier.
		panel: String,
		/// View that declared the panel first.
		first_view: String,
		/// View that declared the panel again.
		second_view: String,
	},

	/// A view declares no panels and can never be navigated to.
	#[error("view '{0}' has no panels")]
	EmptyView(String),
}

/// Errors raised while loading a [`RouterConfig`](crate::RouterConfig).
///
/// Trees violating their invariants surface as parse errors carrying the
/// [`TreeError`] message.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The configuration file could not be read.
	#[error("failed to read router configuration from {}: {source}", .path.display())]
	Io {
		/// Path of the configuration file.
		path: std::path::PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The TOML document could not be parsed.
	#[error("invalid TOML router configuration: {0}")]
	Toml(#[from] toml::de::Error),

	/// The JSON document could not be parsed.
	#[error("invalid JSON router configuration: {0}")]
	Json(#[from] serde_json::Error),
}
