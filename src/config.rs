use super::*;

use std::path::Path;

use serde::Deserialize;

/// Settings for building an [`Initializer`] from a TOML document.
///
/// Every field is optional and falls back to the built-in selectors and the
/// `keypress click` event list:
///
/// ```toml
/// target_selector = 'input[name="text"]'
/// error_selector = ".has-error"
/// events = ["keypress"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitializerConfig {
    pub target_selector: String,
    pub error_selector: String,
    pub events: Vec<String>,
}

impl Default for InitializerConfig {
    fn default() -> Self {
        Self {
            target_selector: TARGET_SELECTOR.to_string(),
            error_selector: ERROR_SELECTOR.to_string(),
            events: DEFAULT_EVENTS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl InitializerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|err| Error::Config(format!("TOML parse error: {err}")))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("cannot read {}: {err}", path.display())))?;
        Self::from_toml_str(&input)
    }

    pub fn build(&self) -> Result<Initializer> {
        Initializer::from_config(self)
    }
}
