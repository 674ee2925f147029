//! wasm-bindgen adapter for strokeplay: the `<animate-svg-component>`
//! behaviour and a pure-data player.

use wasm_bindgen::prelude::*;

mod component;
mod controls;
mod logger;
mod measurer;
mod player;
mod surface;

pub use component::StrokeComponent;
pub use player::StrokePlayer;

pub(crate) fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

pub(crate) fn js_error(context: &str, err: JsValue) -> JsError {
    JsError::new(&format!("{context}: {err:?}"))
}

/// Attribute names the custom element observes.
#[wasm_bindgen]
pub fn observed_attributes() -> js_sys::Array {
    strokeplay_core::OBSERVED_ATTRIBUTES
        .iter()
        .map(|name| JsValue::from_str(name))
        .collect()
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
