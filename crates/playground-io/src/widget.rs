//! Type-to-widget synthesis.

use crate::descriptor::{Descriptor, InputType};
use crate::dom::{Control, Dom};
use crate::{Error, Value};

/// How a widget's value is read back from its control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accessor {
    /// Selected option's value, as text.
    Choice,
    /// `valueAsNumber`, NaN included.
    Number,
    Checked,
    Text,
}

/// A synthesized control together with the accessor for its value.
pub struct Widget<C> {
    control: C,
    accessor: Accessor,
}

impl<C: Control> Widget<C> {
    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn accessor(&self) -> Accessor {
        self.accessor
    }

    /// Read the control's current value.
    pub fn value(&self) -> Value {
        match self.accessor {
            Accessor::Choice | Accessor::Text => Value::Text(self.control.value()),
            Accessor::Number => Value::Number(self.control.value_as_number()),
            Accessor::Checked => Value::Bool(self.control.checked()),
        }
    }
}

impl<C> std::fmt::Debug for Widget<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("accessor", &self.accessor)
            .finish_non_exhaustive()
    }
}

/// Build exactly one control for `descriptor`.
///
/// Types without a dedicated control (unknown names, absent type) get a text
/// input; synthesis never fails because of the descriptor's contents.
pub fn synthesize<D: Dom>(dom: &D, descriptor: &Descriptor) -> Result<Widget<D::Control>, Error> {
    let (control, accessor) = match &descriptor.input_type {
        InputType::Enum(choices) => (
            dom.select(choices, descriptor.default_choice())?,
            Accessor::Choice,
        ),
        InputType::Number => (
            dom.number_input(descriptor.default_number())?,
            Accessor::Number,
        ),
        InputType::Boolean => (
            dom.checkbox(descriptor.default_checked())?,
            Accessor::Checked,
        ),
        InputType::Text => (
            dom.text_input(&descriptor.default_text())?,
            Accessor::Text,
        ),
    };
    Ok(Widget { control, accessor })
}
