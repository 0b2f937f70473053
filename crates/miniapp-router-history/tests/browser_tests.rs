//! Browser adapter tests, run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use miniapp_router_core::NavigationState;
use miniapp_router_history::{BridgeError, BrowserHistory, HostBridge, NativeHistory, VkBridge};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_push_writes_fragment_and_state() {
	let native = BrowserHistory::new().unwrap();
	let state = NavigationState::new("main", "settings")
		.with_param("tab", "2")
		.with_index(1);

	native.push_entry("/main/settings?tab=2", &state).unwrap();

	assert_eq!(native.location_hash().unwrap(), "#/main/settings?tab=2");
}

#[wasm_bindgen_test]
fn test_replace_writes_fragment() {
	let native = BrowserHistory::new().unwrap();

	native
		.replace_entry("/main/home", &NavigationState::new("main", "home"))
		.unwrap();

	assert_eq!(native.location_hash().unwrap(), "#/main/home");
}

#[wasm_bindgen_test]
fn test_pop_state_subscription_can_be_released() {
	let native = BrowserHistory::new().unwrap();

	let subscription = native.on_pop_state(Box::new(|_| {})).unwrap();

	subscription.unsubscribe();
}

#[wasm_bindgen_test]
fn test_vk_bridge_without_host_is_unavailable() {
	let bridge = VkBridge::new();

	let result = bridge.notify_location("/main/home");

	assert!(matches!(result, Err(BridgeError::Unavailable(_))));
}
