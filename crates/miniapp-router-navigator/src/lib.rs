//! History synchronization for the mini-app router.
//!
//! - [`Router`]: owns the memory history and keeps the native history and
//!   the host container in sync with it
//! - [`Navigator`]: explicit handle exposing the [`NavigationContext`] and
//!   the navigation actions
//! - [`RouterLink`]: link helper built on a navigator
//!
//! Every mutating action validates its target against the routing tree
//! unless told otherwise. Rejected actions log a warning and return
//! [`NavigationOutcome::Rejected`]; errors are reserved for construction
//! failures and native history failures.

pub mod context;
pub mod controller;
pub mod error;
pub mod link;
pub mod reconcile;

// Re-export main types for convenience
pub use context::{NavigationContext, Navigator};
pub use controller::{Lifecycle, Router, RouterBuilder};
pub use error::{NavigationOutcome, Rejection, RouterError};
pub use link::{LinkElement, LinkEvent, LinkTarget, RouterLink};
pub use reconcile::pop_state_delta;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;
