//! Browser adapters over `web-sys`.
//!
//! - [`BrowserHistory`] writes router URLs into the location fragment
//!   (`#/view/panel...`) and stores the navigation state with each entry.
//! - [`VkBridge`] forwards location changes to the host through the global
//!   `vkBridge` object.

use crate::bridge::{HostBridge, SET_LOCATION_METHOD};
use crate::error::{BridgeError, NativeHistoryError};
use crate::native::{NativeHistory, PopStateEvent, PopStateHandler};
use crate::subscription::Subscription;
use miniapp_router_core::NavigationState;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;

fn describe(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn js_error(value: JsValue) -> NativeHistoryError {
	NativeHistoryError::Js(describe(&value))
}

fn state_to_js(state: &NavigationState) -> Result<JsValue, NativeHistoryError> {
	state
		.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
		.map_err(|e| NativeHistoryError::State(e.to_string()))
}

fn state_from_js(value: JsValue) -> Result<Option<NavigationState>, NativeHistoryError> {
	if value.is_null() || value.is_undefined() {
		return Ok(None);
	}
	serde_wasm_bindgen::from_value(value)
		.map(Some)
		.map_err(|e| NativeHistoryError::State(e.to_string()))
}

/// [`NativeHistory`] backed by `window.history`.
#[derive(Debug, Clone)]
pub struct BrowserHistory {
	window: web_sys::Window,
}

impl BrowserHistory {
	/// Binds to the global window.
	pub fn new() -> Result<Self, NativeHistoryError> {
		let window = web_sys::window()
			.ok_or_else(|| NativeHistoryError::Unavailable("no global window".to_string()))?;
		Ok(Self { window })
	}

	fn history(&self) -> Result<web_sys::History, NativeHistoryError> {
		self.window
			.history()
			.map_err(|e| NativeHistoryError::Unavailable(describe(&e)))
	}
}

impl NativeHistory for BrowserHistory {
	fn push_entry(&self, url: &str, state: &NavigationState) -> Result<(), NativeHistoryError> {
		let value = state_to_js(state)?;
		self.history()?
			.push_state_with_url(&value, "", Some(&format!("#{}", url)))
			.map_err(js_error)
	}

	fn replace_entry(&self, url: &str, state: &NavigationState) -> Result<(), NativeHistoryError> {
		let value = state_to_js(state)?;
		self.history()?
			.replace_state_with_url(&value, "", Some(&format!("#{}", url)))
			.map_err(js_error)
	}

	fn back(&self) -> Result<(), NativeHistoryError> {
		self.history()?.back().map_err(js_error)
	}

	fn go(&self, delta: isize) -> Result<(), NativeHistoryError> {
		let delta = i32::try_from(delta)
			.map_err(|_| NativeHistoryError::Js(format!("history delta {} is out of range", delta)))?;
		self.history()?.go_with_delta(delta).map_err(js_error)
	}

	fn location_hash(&self) -> Result<String, NativeHistoryError> {
		self.window.location().hash().map_err(js_error)
	}

	fn on_pop_state(&self, handler: PopStateHandler) -> Result<Subscription, NativeHistoryError> {
		let closure = Closure::<dyn FnMut(web_sys::PopStateEvent)>::new(
			move |event: web_sys::PopStateEvent| match state_from_js(event.state()) {
				Ok(state) => handler(&PopStateEvent { state }),
				Err(err) => tracing::warn!(error = %err, "ignoring popstate event carrying a foreign state"),
			},
		);

		self.window
			.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
			.map_err(js_error)?;

		let window = self.window.clone();
		Ok(Subscription::new(move || {
			if let Err(err) = window
				.remove_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
			{
				tracing::warn!(error = %describe(&err), "failed to remove popstate listener");
			}
		}))
	}
}

/// [`HostBridge`] calling `window.vkBridge.send(method, { location })`.
///
/// The promise returned by `send` is not awaited.
#[derive(Debug, Clone)]
pub struct VkBridge {
	method: String,
}

impl Default for VkBridge {
	fn default() -> Self {
		Self {
			method: SET_LOCATION_METHOD.to_string(),
		}
	}
}

impl VkBridge {
	/// Creates a bridge using `VKWebAppSetLocation`.
	pub fn new() -> Self {
		Self::default()
	}

	/// Uses another bridge method name.
	pub fn with_method(mut self, method: impl Into<String>) -> Self {
		self.method = method.into();
		self
	}

	fn call_error(&self, value: &JsValue) -> BridgeError {
		BridgeError::Call {
			method: self.method.clone(),
			message: describe(value),
		}
	}
}

impl HostBridge for VkBridge {
	fn notify_location(&self, location: &str) -> Result<(), BridgeError> {
		let window =
			web_sys::window().ok_or_else(|| BridgeError::Unavailable("no global window".to_string()))?;
		let global: &JsValue = window.as_ref();

		let bridge = js_sys::Reflect::get(global, &JsValue::from_str("vkBridge"))
			.map_err(|e| BridgeError::Unavailable(describe(&e)))?;
		if bridge.is_undefined() || bridge.is_null() {
			return Err(BridgeError::Unavailable(
				"window.vkBridge is not defined".to_string(),
			));
		}

		let send = js_sys::Reflect::get(&bridge, &JsValue::from_str("send"))
			.map_err(|e| BridgeError::Unavailable(describe(&e)))?
			.dyn_into::<js_sys::Function>()
			.map_err(|_| BridgeError::Unavailable("vkBridge.send is not a function".to_string()))?;

		let payload = js_sys::Object::new();
		js_sys::Reflect::set(&payload, &JsValue::from_str("location"), &JsValue::from_str(location))
			.map_err(|e| self.call_error(&e))?;

		send.call2(&bridge, &JsValue::from_str(&self.method), &payload)
			.map_err(|e| self.call_error(&e))?;
		Ok(())
	}
}
