//! Page-level runtime settings.

use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::scheduler::QUIET_PERIOD;

/// Settings passed to `defineElements`. Every field is optional on the JS side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Tag of the custom input element.
    pub input_tag: String,
    /// Tag of the custom action element.
    pub action_tag: String,
    /// Property of `window` holding `applications` and `zone`.
    pub global_name: String,
    pub quiet_period_ms: u64,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_tag: "playground-input".to_owned(),
            action_tag: "playground-action".to_owned(),
            global_name: "playgroundHost".to_owned(),
            quiet_period_ms: QUIET_PERIOD.as_millis() as u64,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_tag(&self.input_tag)?;
        validate_tag(&self.action_tag)?;
        if self.input_tag == self.action_tag {
            return Err(Error::InvalidConfig(format!(
                "input and action elements share the tag `{}`",
                self.input_tag
            )));
        }
        if self.global_name.trim().is_empty() {
            return Err(Error::InvalidConfig("global name is empty".to_owned()));
        }
        Ok(())
    }
}

/// Custom element names: lowercase ASCII letter first, at least one hyphen.
fn validate_tag(tag: &str) -> Result<(), Error> {
    let invalid = |reason: &str| Err(Error::InvalidConfig(format!("tag `{tag}` {reason}")));
    if !tag.starts_with(|c: char| c.is_ascii_lowercase()) {
        return invalid("must start with a lowercase letter");
    }
    if !tag.contains('-') {
        return invalid("must contain a hyphen");
    }
    if tag.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
        return invalid("must be lowercase without whitespace");
    }
    Ok(())
}
