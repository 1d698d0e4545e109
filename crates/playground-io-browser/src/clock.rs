use std::time::Duration;

use playground_io::Error;
use playground_io::clock::{Clock, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::dom::js_error;

/// `setTimeout` on the page's window.
pub struct BrowserClock {
    window: Window,
}

impl BrowserClock {
    pub fn new() -> Result<Self, Error> {
        let window =
            web_sys::window().ok_or_else(|| Error::host("no window to schedule timers on"))?;
        Ok(Self { window })
    }
}

impl Clock for BrowserClock {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Result<Timeout, Error> {
        let closure = Closure::once(callback);
        let delay = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay,
            )
            .map_err(js_error)?;
        let window = self.window.clone();
        Ok(Timeout::new(move || {
            window.clear_timeout_with_handle(id);
            drop(closure);
        }))
    }
}
