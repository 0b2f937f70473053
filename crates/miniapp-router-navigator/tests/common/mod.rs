//! Shared fixtures for router integration tests.

#![allow(dead_code)]

use miniapp_router_core::{RouterConfig, RoutingTree};
use miniapp_router_history::{MemoryNativeHistory, RecordingBridge};
use miniapp_router_navigator::Router;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Routing fixtures
// ============================================================================

/// `main` view with `home` and `settings`, `profile` view with `card`, and
/// the `confirm` popup.
pub fn tree() -> RoutingTree {
	RoutingTree::builder()
		.view("main", ["home", "settings"])
		.view("profile", ["card"])
		.popup("confirm")
		.build()
		.unwrap()
}

/// Native history, bridge and router built from `config` over `hash`.
pub struct Harness {
	pub router: Router,
	pub native: MemoryNativeHistory,
	pub bridge: RecordingBridge,
}

impl Harness {
	pub fn new(config: RouterConfig, hash: &str) -> Self {
		let native = MemoryNativeHistory::new(hash);
		let bridge = RecordingBridge::new();
		let router = Router::new(config, native.clone(), bridge.clone()).unwrap();
		Self {
			router,
			native,
			bridge,
		}
	}

	/// Harness on `#/main/home` with an empty initial history, mounted.
	pub fn mounted() -> Self {
		let harness = Self::new(RouterConfig::new(tree()), "#/main/home");
		harness.router.mount().unwrap();
		harness
	}
}

// ============================================================================
// Log capture
// ============================================================================

/// A captured log event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
	pub level: tracing::Level,
	pub message: String,
	pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
	pub fn field(&self, name: &str) -> Option<&str> {
		self.fields
			.iter()
			.find(|(field, _)| field == name)
			.map(|(_, value)| value.as_str())
	}
}

struct EventCapture {
	events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor {
	message: String,
	fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
	fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
		if field.name() == "message" {
			self.message = format!("{value:?}");
		} else {
			self.fields.push((field.name().to_string(), format!("{value:?}")));
		}
	}

	fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
		if field.name() == "message" {
			self.message = value.to_string();
		} else {
			self.fields.push((field.name().to_string(), value.to_string()));
		}
	}
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
		let mut visitor = FieldVisitor {
			message: String::new(),
			fields: Vec::new(),
		};
		event.record(&mut visitor);
		self.events.lock().unwrap().push(CapturedEvent {
			level: *event.metadata().level(),
			message: visitor.message,
			fields: visitor.fields,
		});
	}
}

/// Runs `f` with a subscriber capturing every event and returns its result
/// with the captured events.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedEvent>) {
	let events = Arc::new(Mutex::new(Vec::new()));
	let subscriber = tracing_subscriber::registry().with(EventCapture {
		events: Arc::clone(&events),
	});
	let result = tracing::subscriber::with_default(subscriber, f);
	let events = events.lock().unwrap().clone();
	(result, events)
}

/// Captured warnings.
pub fn warnings(events: &[CapturedEvent]) -> Vec<&CapturedEvent> {
	events
		.iter()
		.filter(|event| event.level == tracing::Level::WARN)
		.collect()
}
