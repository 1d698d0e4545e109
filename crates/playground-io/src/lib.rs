//! Interactive inputs for documentation pages.
//!
//! A page embeds running applications next to custom elements of two kinds:
//!
//! - an input element carries a JSON [`Descriptor`]; its [`ValueBinder`]
//!   replaces it with a matching form control and pushes every edit into an
//!   input of the application's root component,
//! - an action element becomes a button whose [`ActionBinder`] calls a
//!   zero-argument method on that component.
//!
//! Edits commit on `change` immediately and on `input` after a quiet period.
//! Applications are looked up asynchronously by index, and every write runs
//! inside the host framework's [`MutationContext`](resolver::MutationContext).
//!
//! Everything here is written against small traits ([`dom`], [`clock`],
//! [`resolver`]) so it runs unchanged in a browser and in unit tests.

pub mod binder;
pub mod clock;
pub mod config;
pub mod descriptor;
pub mod dom;
mod error;
pub mod markup;
pub mod resolver;
pub mod scheduler;
mod value;
pub mod widget;

#[cfg(test)]
mod testing;

pub use binder::{ActionBinder, Attachable, Identity, Runtime, ValueBinder};
pub use config::Config;
pub use descriptor::{Descriptor, InputType};
pub use error::Error;
pub use value::Value;
pub use widget::{Accessor, Widget, synthesize};
