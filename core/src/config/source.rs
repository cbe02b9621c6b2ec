//! Launch configuration providers.
//!
//! A launch can be described by a props object handed over by the host, by
//! launch parameters on the page URL, or by the item currently selected in a
//! feed. All of them produce the same loosely typed [`LaunchConfig`], which
//! is the only input the normalizer sees.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::form_urlencoded;

use super::ConfigError;

/// Keys a launch config must carry for a source to be considered complete.
const REQUIRED_KEYS: [&str; 3] = ["title", "rom", "type"];

/// Loosely typed launch configuration.
///
/// Every field may hold any JSON value; validation happens in
/// [`normalize`](super::normalize).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaunchConfig(Map<String, Value>);

impl LaunchConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ConfigError::Malformed(format!(
                "launch config must be an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Builder-style setter.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Raw value of a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether a field is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether a field holds a truthy value (present, not null/false/0/"").
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !super::value::is_blank(v))
    }

    /// Whether the config names a title, a ROM and a console type.
    pub fn is_complete(&self) -> bool {
        REQUIRED_KEYS.iter().all(|k| self.has_value(k))
    }

    /// Copy every field of `other` into this config, overwriting duplicates.
    pub fn merge(&mut self, other: LaunchConfig) {
        self.0.extend(other.0);
    }

    /// Iterate over raw fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Where a launch configuration comes from.
///
/// Returning `None` means the source has nothing to offer (e.g. a feed
/// with no selected item); the caller decides what to fall back to.
pub trait ConfigSource {
    /// Produce the raw launch configuration.
    fn launch_config(&self) -> Option<LaunchConfig>;

    /// Short description for log lines.
    fn describe(&self) -> &'static str;
}

impl<T: ConfigSource + ?Sized> ConfigSource for Box<T> {
    fn launch_config(&self) -> Option<LaunchConfig> {
        (**self).launch_config()
    }

    fn describe(&self) -> &'static str {
        (**self).describe()
    }
}

/// A props object supplied directly by the host.
#[derive(Debug, Clone)]
pub struct PropsSource(pub LaunchConfig);

impl ConfigSource for PropsSource {
    fn launch_config(&self) -> Option<LaunchConfig> {
        Some(self.0.clone())
    }

    fn describe(&self) -> &'static str {
        "props"
    }
}

/// Launch parameters encoded as `key=value&key=value`.
///
/// A leading `?` is ignored and keys/values are percent-decoded (`+` is a
/// space). The literals `true` and `false` become JSON booleans; every other
/// value stays a string and is coerced later by the normalizer.
#[derive(Debug, Clone)]
pub struct QuerySource {
    query: String,
}

impl QuerySource {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl ConfigSource for QuerySource {
    fn launch_config(&self) -> Option<LaunchConfig> {
        let query = self.query.trim().trim_start_matches('?');
        if query.is_empty() {
            return None;
        }

        let mut config = LaunchConfig::new();
        for (key, raw) in form_urlencoded::parse(query.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            let value = match &*raw {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                other => Value::String(other.to_string()),
            };
            config.set(&key, value);
        }
        Some(config)
    }

    fn describe(&self) -> &'static str {
        "launch parameters"
    }
}

/// The item currently selected in a feed.
///
/// Feed items keep their launch props separately from their title and
/// type; this source folds them back into one launch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedItemSource {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub console_type: Option<String>,
    #[serde(default)]
    pub props: Option<LaunchConfig>,
}

impl FeedItemSource {
    /// Parse a feed item from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))
    }
}

impl ConfigSource for FeedItemSource {
    fn launch_config(&self) -> Option<LaunchConfig> {
        let mut config = self.props.clone()?;
        if let Some(title) = &self.title {
            config.set("title", title.as_str());
        }
        if let Some(console_type) = &self.console_type {
            config.set("type", console_type.as_str());
        }
        Some(config)
    }

    fn describe(&self) -> &'static str {
        "feed item"
    }
}

/// Uses `primary` unless it lacks a title, ROM or type, then tries `fallback`.
///
/// If the fallback has nothing either, the primary config is returned as-is
/// so the normalizer can report what is missing.
pub struct FallbackSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P: ConfigSource, F: ConfigSource> FallbackSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: ConfigSource, F: ConfigSource> ConfigSource for FallbackSource<P, F> {
    fn launch_config(&self) -> Option<LaunchConfig> {
        let primary = self.primary.launch_config();
        if primary.as_ref().is_some_and(LaunchConfig::is_complete) {
            return primary;
        }

        tracing::warn!(
            "{} config is incomplete, trying {}",
            self.primary.describe(),
            self.fallback.describe()
        );
        match self.fallback.launch_config() {
            Some(config) => {
                tracing::debug!("Using launch config from {}", self.fallback.describe());
                Some(config)
            }
            None => primary,
        }
    }

    fn describe(&self) -> &'static str {
        self.primary.describe()
    }
}
