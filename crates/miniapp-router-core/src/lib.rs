//! Pure building blocks of the mini-app router.
//!
//! This crate contains everything that does not touch a history:
//!
//! - **Routing tree**: [`RoutingTree`] and the [`is_valid`] validator
//! - **Navigation state**: [`NavigationState`], [`NavigationUpdate`], [`Query`]
//! - **Codecs**: [`encode`] / [`decode`] for URLs and the nested
//!   [`QueryCodec`] for query strings
//! - **Builder**: [`build_state`] merges an update into the current state
//! - **Configuration**: [`RouterConfig`] loaded from code, TOML or JSON
//!
//! # Quick Start
//!
//! ```rust
//! use miniapp_router_core::{
//! 	NavigationState, NavigationUpdate, RoutingTree, build_state, encode, is_valid,
//! };
//!
//! let tree = RoutingTree::builder()
//! 	.view("main", ["home", "settings"])
//! 	.popup("confirm")
//! 	.build()
//! 	.unwrap();
//!
//! let current = NavigationState::new("main", "home");
//! let next = build_state(&current, &NavigationUpdate::for_popup("confirm"), Some(1));
//!
//! assert!(is_valid(&next, &tree));
//! assert_eq!(encode(&next), "/main/home/confirm");
//! ```

pub mod builder;
pub mod codec;
pub mod config;
pub mod error;
pub mod location;
pub mod query;
pub mod state;
pub mod tree;

// Re-export main types for convenience
pub use builder::build_state;
pub use codec::{decode, decode_with, encode, encode_with, normalize, normalize_with};
pub use config::RouterConfig;
pub use error::{ConfigError, IdKind, TreeError};
pub use location::Location;
pub use query::{NestedQueryCodec, QueryCodec, parse_query, stringify_query};
pub use state::{NavigationState, NavigationUpdate, Query, QueryValue};
pub use tree::{RoutingTree, RoutingTreeBuilder, is_valid};

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
