//! Browser runtime for `playground-io`.
//!
//! Load the module, then call `defineElements()` (optionally with a config
//! object) once the page's applications are being bootstrapped.

pub mod clock;
pub mod dom;
pub mod elements;
pub mod host;
mod logger;
pub mod task;

use log::LevelFilter;
use playground_io::{Config, Error};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    logger::init(LevelFilter::Info);
}

/// Define the custom elements. `config` may be `undefined`; missing fields
/// take their defaults.
#[wasm_bindgen(js_name = defineElements)]
pub fn define_elements(config: JsValue) -> Result<(), JsValue> {
    let config: Config = if config.is_undefined() || config.is_null() {
        Config::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };
    logger::init(config.log_level);
    config.validate().map_err(into_js)?;
    elements::define(&config).map_err(into_js)
}

fn into_js(error: Error) -> JsValue {
    log::error!("{error}");
    js_sys::Error::new(&error.to_string()).into()
}
