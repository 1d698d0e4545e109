//! The slice of the DOM the binders need.
//!
//! The browser crate implements these traits over web-sys; tests use the
//! in-memory implementation in `testing`.

use crate::Error;

/// Native events a control can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlEvent {
    /// Committed edit: blur after typing, checkbox toggle, select choice.
    Change,
    /// Every raw edit while typing.
    Input,
    Click,
}

impl ControlEvent {
    pub fn name(self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Input => "input",
            Self::Click => "click",
        }
    }
}

/// A live form control or button.
pub trait Control: 'static {
    /// Keeps a listener installed. Dropping it removes the listener.
    type Listener;

    /// The control's `value`: field text, or the selected option's value.
    fn value(&self) -> String;

    /// The control's `valueAsNumber`. NaN when the field is empty.
    fn value_as_number(&self) -> f64;

    /// Checked state of a checkbox.
    fn checked(&self) -> bool;

    fn listen(
        &self,
        event: ControlEvent,
        handler: Box<dyn FnMut()>,
    ) -> Result<Self::Listener, Error>;
}

/// Creates controls.
pub trait Dom {
    type Control: Control;

    /// A `<select>` with one option per choice, in order. `selected` picks the
    /// option with that value; with no match the first option is selected.
    fn select(&self, choices: &[String], selected: Option<&str>) -> Result<Self::Control, Error>;

    /// An `<input type="number">` holding `value` (NaN leaves it empty).
    fn number_input(&self, value: f64) -> Result<Self::Control, Error>;

    /// An `<input type="checkbox">`.
    fn checkbox(&self, checked: bool) -> Result<Self::Control, Error>;

    /// An `<input type="text">`.
    fn text_input(&self, value: &str) -> Result<Self::Control, Error>;

    /// A `<button>` whose content is `label` rendered as code.
    fn button(&self, label: &str) -> Result<Self::Control, Error>;
}

/// The custom element a binder is attached to.
pub trait HostElement: 'static {
    type Dom: Dom;

    fn dom(&self) -> &Self::Dom;

    fn attribute(&self, name: &str) -> Option<String>;

    /// Text content, with entities decoded.
    fn text_content(&self) -> String;

    /// Remove every child, then append `control`.
    fn replace_children(&self, control: &<Self::Dom as Dom>::Control) -> Result<(), Error>;
}
