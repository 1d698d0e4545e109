//! Custom element registration.
//!
//! The element classes live in JS and only forward their lifecycle callbacks.
//! Each element keeps its own [`ElementBinder`] under a private symbol, so a
//! reconnected element finds the binder it was first given, and a binder goes
//! away with its element.

use std::rc::Rc;

use playground_io::resolver::Resolver;
use playground_io::{ActionBinder, Attachable, Config, Error, Runtime, ValueBinder};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::clock::BrowserClock;
use crate::dom::{BrowserDom, BrowserHost, js_error};
use crate::host::{GlobalRegistry, GlobalZone};
use crate::task::TaskSpawner;

#[wasm_bindgen(inline_js = r#"
const BINDER = Symbol("binder");

export function define_binder_element(tag, create) {
    if (customElements.get(tag) !== undefined) {
        return false;
    }
    customElements.define(tag, class extends HTMLElement {
        connectedCallback() {
            if (this[BINDER] === undefined) {
                this[BINDER] = create(this);
            }
            this[BINDER].attach();
        }
        disconnectedCallback() {
            if (this[BINDER] !== undefined) {
                this[BINDER].detach();
            }
        }
    });
    return true;
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn define_binder_element(
        tag: &str,
        create: &Closure<dyn FnMut(HtmlElement) -> ElementBinder>,
    ) -> Result<bool, JsValue>;
}

/// The binder owned by one custom element.
///
/// `attach` throws when the element cannot be bound, so the failure surfaces
/// from `connectedCallback` like any other page error.
#[wasm_bindgen]
pub struct ElementBinder {
    tag: String,
    binder: Box<dyn Attachable>,
}

impl ElementBinder {
    pub fn new(tag: impl Into<String>, binder: Box<dyn Attachable>) -> Self {
        Self {
            tag: tag.into(),
            binder,
        }
    }
}

#[wasm_bindgen]
impl ElementBinder {
    pub fn attach(&mut self) -> Result<(), JsValue> {
        self.binder.on_attach().map_err(|error| {
            log::error!("cannot bind <{}>: {error}", self.tag);
            js_sys::Error::new(&format!("cannot bind <{}>: {error}", self.tag)).into()
        })
    }

    pub fn detach(&mut self) {
        self.binder.on_detach();
    }
}

/// Define the input and action elements named by `config`.
pub fn define(config: &Config) -> Result<(), Error> {
    let runtime = Runtime::new(
        Resolver::new(
            Rc::new(GlobalRegistry::new(&config.global_name)),
            Rc::new(GlobalZone::new(&config.global_name)),
        ),
        Rc::new(TaskSpawner),
        Rc::new(BrowserClock::new()?),
    )
    .with_quiet_period(config.quiet_period());
    let dom = BrowserDom::new()?;

    define_element(&config.input_tag, {
        let runtime = runtime.clone();
        let dom = dom.clone();
        move |element| {
            Box::new(ValueBinder::new(
                BrowserHost::new(element, dom.clone()),
                runtime.clone(),
            )) as Box<dyn Attachable>
        }
    })?;
    define_element(&config.action_tag, move |element| {
        Box::new(ActionBinder::new(
            BrowserHost::new(element, dom.clone()),
            runtime.clone(),
        )) as Box<dyn Attachable>
    })
}

fn define_element(
    tag: &str,
    create: impl Fn(HtmlElement) -> Box<dyn Attachable> + 'static,
) -> Result<(), Error> {
    let name = tag.to_owned();
    let create = Closure::<dyn FnMut(HtmlElement) -> ElementBinder>::new(
        move |element: HtmlElement| ElementBinder::new(name.clone(), create(element)),
    );

    if define_binder_element(tag, &create).map_err(js_error)? {
        // Element definitions live as long as the page
        create.forget();
        log::info!("defined <{tag}>");
    } else {
        log::warn!("<{tag}> is already defined, keeping the existing definition");
    }
    Ok(())
}
