//! Widget descriptors authored inside the custom input tag.
//!
//! A descriptor is a JSON object `{"type": ..., "default": ...}`. The `type` is
//! either a primitive name (`"number"`, `"boolean"`, `"string"`, matched
//! case-insensitively) or `{"enum": [...]}`. Anything else is read as text;
//! an unknown type must never keep a widget from rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::Error;

/// What kind of widget a descriptor asks for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Json", into = "Json")]
pub enum InputType {
    Number,
    Boolean,
    /// A fixed, ordered set of string choices.
    Enum(Vec<String>),
    /// Free text. Also the fallback for absent or unrecognized types.
    #[default]
    Text,
}

impl InputType {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }
}

impl From<Json> for InputType {
    fn from(json: Json) -> Self {
        match json {
            Json::String(name) if name.eq_ignore_ascii_case("number") => Self::Number,
            Json::String(name) if name.eq_ignore_ascii_case("boolean") => Self::Boolean,
            Json::Object(mut object) => match object.remove("enum") {
                Some(Json::Array(choices)) => {
                    Self::Enum(choices.into_iter().map(json_to_text).collect())
                }
                _ => Self::Text,
            },
            _ => Self::Text,
        }
    }
}

impl From<InputType> for Json {
    fn from(input_type: InputType) -> Self {
        match input_type {
            InputType::Number => Json::from("number"),
            InputType::Boolean => Json::from("boolean"),
            InputType::Text => Json::from("string"),
            InputType::Enum(choices) => serde_json::json!({ "enum": choices }),
        }
    }
}

/// Declarative description of one widget: its type and its initial value.
///
/// `default` should be representable by `input_type`. That is the author's
/// responsibility; the synthesizer coerces whatever it gets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(rename = "type", default)]
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Json>,
}

impl Descriptor {
    pub fn new(input_type: InputType, default: Option<Json>) -> Self {
        Self { input_type, default }
    }

    /// Parse the payload embedded in a host element.
    pub fn parse(payload: &str) -> Result<Self, Error> {
        serde_json::from_str(payload).map_err(Error::MalformedDescriptor)
    }

    /// Infer the type from a default value alone.
    pub fn from_default(default: impl Into<Json>) -> Self {
        let default = default.into();
        let input_type = match &default {
            Json::Bool(_) => InputType::Boolean,
            Json::Number(_) => InputType::Number,
            _ => InputType::Text,
        };
        Self {
            input_type,
            default: Some(default),
        }
    }

    /// Fill the gaps of `self` from `fallback`.
    ///
    /// The default falls through when `self` has none. A text type is replaced
    /// by an enum type, since text is what an unannotated value infers to.
    pub fn merge(self, fallback: Descriptor) -> Descriptor {
        let input_type = if self.input_type.is_text() && fallback.input_type.is_enum() {
            fallback.input_type
        } else {
            self.input_type
        };
        Descriptor {
            input_type,
            default: self.default.or(fallback.default),
        }
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Error::Encode)
    }

    /// The default coerced to a number the way a numeric input would.
    ///
    /// No default yields NaN (an empty field), and so does anything that is
    /// not finite: a number input cannot hold an infinite value.
    pub fn default_number(&self) -> f64 {
        let number = match &self.default {
            None => f64::NAN,
            Some(Json::Null) => 0.0,
            Some(Json::Bool(value)) => f64::from(u8::from(*value)),
            Some(Json::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
            Some(Json::String(text)) => string_to_number(text),
            Some(Json::Array(_) | Json::Object(_)) => f64::NAN,
        };
        if number.is_finite() { number } else { f64::NAN }
    }

    /// Truthiness of the default.
    pub fn default_checked(&self) -> bool {
        match &self.default {
            None | Some(Json::Null) => false,
            Some(Json::Bool(value)) => *value,
            Some(Json::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Some(Json::String(text)) => !text.is_empty(),
            Some(Json::Array(_) | Json::Object(_)) => true,
        }
    }

    /// The default as field text, or an empty string when it is falsy.
    pub fn default_text(&self) -> String {
        match &self.default {
            Some(default) if self.default_checked() => json_to_text(default.clone()),
            _ => String::new(),
        }
    }

    /// The default if it names a choice, compared by strict equality.
    pub fn default_choice(&self) -> Option<&str> {
        self.default.as_ref().and_then(Json::as_str)
    }
}

/// JS `Number(text)`: blank is 0, otherwise the whole trimmed text must be a
/// numeric literal. Rust's float grammar is wider (`inf`, `nan`), so the text
/// is checked before it is parsed.
fn string_to_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&text[2..], radix).map_or(f64::NAN, |value| value as f64);
    }
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return if text.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    if is_decimal_literal(unsigned) {
        text.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// `digits[.digits][e[+-]digits]` or `.digits[e[+-]digits]`.
fn is_decimal_literal(text: &str) -> bool {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    };
    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    let mantissa_ok =
        digits(integer) && digits(fraction) && !(integer.is_empty() && fraction.is_empty());
    let exponent_ok = exponent.is_none_or(|exponent| {
        let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        !exponent.is_empty() && digits(exponent)
    });
    mantissa_ok && exponent_ok
}

fn json_to_text(json: Json) -> String {
    match json {
        Json::String(text) => text,
        Json::Number(number) => match number.as_f64() {
            Some(value) if number.is_f64() => value.to_string(),
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}
