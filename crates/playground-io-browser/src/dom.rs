use playground_io::Error;
use playground_io::dom::{Control, ControlEvent, Dom, HostElement};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlOptionElement,
    HtmlSelectElement,
};

/// Wrap a thrown JS value.
pub(crate) fn js_error(error: JsValue) -> Error {
    match error.dyn_ref::<js_sys::Error>() {
        Some(error) => Error::host(String::from(error.message())),
        None => Error::host(format!("{error:?}")),
    }
}

#[derive(Clone)]
pub struct BrowserDom {
    document: Document,
}

impl BrowserDom {
    pub fn new() -> Result<Self, Error> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| Error::host("no document to create controls in"))?;
        Ok(Self { document })
    }

    fn create<T: JsCast>(&self, tag: &str) -> Result<T, Error> {
        self.document
            .create_element(tag)
            .map_err(js_error)?
            .dyn_into::<T>()
            .map_err(|_| Error::host(format!("<{tag}> has an unexpected element type")))
    }

    fn input(&self, input_type: &str) -> Result<HtmlInputElement, Error> {
        let input: HtmlInputElement = self.create("input")?;
        input.set_type(input_type);
        Ok(input)
    }
}

impl Dom for BrowserDom {
    type Control = BrowserControl;

    fn select(&self, choices: &[String], selected: Option<&str>) -> Result<BrowserControl, Error> {
        let select: HtmlSelectElement = self.create("select")?;
        for choice in choices {
            let option: HtmlOptionElement = self.create("option")?;
            option.set_value(choice);
            option.set_text(choice);
            option.set_selected(Some(choice.as_str()) == selected);
            select.append_child(&option).map_err(js_error)?;
        }
        Ok(BrowserControl::new(select))
    }

    fn number_input(&self, value: f64) -> Result<BrowserControl, Error> {
        let input = self.input("number")?;
        // The `valueAsNumber` setter throws on infinities; NaN clears the field
        if value.is_finite() {
            input.set_value_as_number(value);
        }
        Ok(BrowserControl::new(input))
    }

    fn checkbox(&self, checked: bool) -> Result<BrowserControl, Error> {
        let input = self.input("checkbox")?;
        input.set_checked(checked);
        Ok(BrowserControl::new(input))
    }

    fn text_input(&self, value: &str) -> Result<BrowserControl, Error> {
        let input = self.input("text")?;
        input.set_value(value);
        Ok(BrowserControl::new(input))
    }

    fn button(&self, label: &str) -> Result<BrowserControl, Error> {
        let button: HtmlButtonElement = self.create("button")?;
        let code: HtmlElement = self.create("code")?;
        code.set_text_content(Some(label));
        button.append_child(&code).map_err(js_error)?;
        Ok(BrowserControl::new(button))
    }
}

/// An `<input>`, `<select>` or `<button>`.
#[derive(Clone)]
pub struct BrowserControl {
    element: HtmlElement,
}

impl BrowserControl {
    fn new(element: impl Into<HtmlElement>) -> Self {
        Self {
            element: element.into(),
        }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl Control for BrowserControl {
    type Listener = BrowserListener;

    fn value(&self) -> String {
        if let Some(input) = self.element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(select) = self.element.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn value_as_number(&self) -> f64 {
        self.element
            .dyn_ref::<HtmlInputElement>()
            .map_or(f64::NAN, HtmlInputElement::value_as_number)
    }

    fn checked(&self) -> bool {
        self.element
            .dyn_ref::<HtmlInputElement>()
            .is_some_and(HtmlInputElement::checked)
    }

    fn listen(
        &self,
        event: ControlEvent,
        handler: Box<dyn FnMut()>,
    ) -> Result<BrowserListener, Error> {
        let closure = Closure::<dyn FnMut()>::wrap(handler);
        self.element
            .add_event_listener_with_callback(event.name(), closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        Ok(BrowserListener {
            element: self.element.clone(),
            event: event.name(),
            closure,
        })
    }
}

/// Removes its event listener when dropped.
pub struct BrowserListener {
    element: HtmlElement,
    event: &'static str,
    closure: Closure<dyn FnMut()>,
}

impl Drop for BrowserListener {
    fn drop(&mut self) {
        let _ = self
            .element
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// A connected custom element.
pub struct BrowserHost {
    element: HtmlElement,
    dom: BrowserDom,
}

impl BrowserHost {
    pub fn new(element: HtmlElement, dom: BrowserDom) -> Self {
        Self { element, dom }
    }
}

impl HostElement for BrowserHost {
    type Dom = BrowserDom;

    fn dom(&self) -> &BrowserDom {
        &self.dom
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn text_content(&self) -> String {
        self.element.text_content().unwrap_or_default()
    }

    fn replace_children(&self, control: &BrowserControl) -> Result<(), Error> {
        self.element.set_text_content(None);
        self.element.append_child(control.element()).map_err(js_error)?;
        Ok(())
    }
}
