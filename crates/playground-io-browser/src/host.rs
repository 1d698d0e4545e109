//! The page's application registry and zone, reached through a window global.
//!
//! `window[globalName]` is expected to look like
//! `{ applications: [Promise<ApplicationRef> | ApplicationRef, ...], zone: { run(fn) } }`.
//! Nothing is looked up before it is needed, so the global may be installed
//! after the elements are defined.

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::future::{FutureExt, LocalBoxFuture};
use js_sys::{Function, Promise, Reflect};
use playground_io::Error;
use playground_io::Value;
use playground_io::resolver::{
    ApplicationHandle, ApplicationRegistry, Component, Mutation, MutationContext,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::dom::js_error;

fn property(target: &JsValue, key: &str) -> Result<JsValue, Error> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(js_error)
}

fn method(target: &JsValue, key: &str) -> Result<Function, Error> {
    property(target, key)?
        .dyn_into::<Function>()
        .map_err(|_| Error::host(format!("`{key}` is not a function")))
}

fn is_missing(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

fn host_object(global_name: &str) -> Result<JsValue, Error> {
    let window = web_sys::window().ok_or_else(|| Error::host("no window"))?;
    let host = property(&window, global_name)?;
    if is_missing(&host) {
        return Err(Error::host(format!("`window.{global_name}` is not defined")));
    }
    Ok(host)
}

pub fn to_js(value: &Value) -> JsValue {
    match value {
        Value::Number(number) => JsValue::from_f64(*number),
        Value::Bool(value) => JsValue::from_bool(*value),
        Value::Text(text) => JsValue::from_str(text),
    }
}

/// `window[globalName].applications`.
pub struct GlobalRegistry {
    global_name: String,
}

impl GlobalRegistry {
    pub fn new(global_name: impl Into<String>) -> Self {
        Self {
            global_name: global_name.into(),
        }
    }

    fn slot(&self, index: usize) -> Result<JsValue, Error> {
        let applications = property(&host_object(&self.global_name)?, "applications")?;
        let key = u32::try_from(index).map_err(|_| Error::UnknownApplication(index))?;
        let slot = Reflect::get_u32(&applications, key).map_err(js_error)?;
        if slot.is_undefined() {
            return Err(Error::UnknownApplication(index));
        }
        Ok(slot)
    }
}

impl ApplicationRegistry for GlobalRegistry {
    fn application(
        &self,
        index: usize,
    ) -> LocalBoxFuture<'static, Result<Rc<dyn ApplicationHandle>, Error>> {
        let slot = self.slot(index);
        async move {
            // Plain handles and promises are both accepted
            let promise = Promise::resolve(&slot?);
            let handle = JsFuture::from(promise).await.map_err(js_error)?;
            Ok(Rc::new(JsApplication { handle }) as Rc<dyn ApplicationHandle>)
        }
        .boxed_local()
    }
}

struct JsApplication {
    handle: JsValue,
}

impl ApplicationHandle for JsApplication {
    fn root_component(&self) -> Option<Rc<dyn Component>> {
        let components = property(&self.handle, "components").ok()?;
        let component = Reflect::get_u32(&components, 0).ok()?;
        if is_missing(&component) {
            return None;
        }
        Some(Rc::new(JsComponent { component }))
    }
}

/// A component reference: `setInput` on the reference, methods on `instance`.
struct JsComponent {
    component: JsValue,
}

impl Component for JsComponent {
    fn set_input(&self, name: &str, value: Value) -> Result<(), Error> {
        method(&self.component, "setInput")?
            .call2(&self.component, &JsValue::from_str(name), &to_js(&value))
            .map_err(js_error)?;
        Ok(())
    }

    fn invoke(&self, name: &str) -> Result<(), Error> {
        let instance = property(&self.component, "instance")?;
        method(&instance, name)?.call0(&instance).map_err(js_error)?;
        Ok(())
    }
}

/// `window[globalName].zone`.
pub struct GlobalZone {
    global_name: String,
}

impl GlobalZone {
    pub fn new(global_name: impl Into<String>) -> Self {
        Self {
            global_name: global_name.into(),
        }
    }
}

impl MutationContext for GlobalZone {
    fn run(&self, mutation: Mutation) -> Result<(), Error> {
        let zone = property(&host_object(&self.global_name)?, "zone")?;
        let run = method(&zone, "run")?;

        let outcome = Rc::new(RefCell::new(None));
        let callback = Closure::once({
            let outcome = outcome.clone();
            move || {
                outcome.replace(Some(mutation()));
            }
        });
        run.call1(&zone, callback.as_ref()).map_err(js_error)?;
        drop(callback);

        outcome
            .take()
            .unwrap_or_else(|| Err(Error::host("zone did not run the mutation")))
    }
}
