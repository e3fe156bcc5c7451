//! Marker declarations and the marker registry
//!
//! A [`DebugLog`] marker is the configuration triple attached to a type or a
//! method. The [`MarkerRegistry`] stores markers for both levels and answers
//! two questions for a call site: is it intercepted at all, and with which
//! [`CallConfig`].
//!
//! # Example debuglog.toml
//!
//! ```toml
//! # Every method of Calculator, in milliseconds
//! [types.Calculator]
//! threshold = 1
//!
//! # Calculator::add overrides the type marker entirely
//! [methods."Calculator::add"]
//! threshold = 500
//! time_unit = "micro"
//! show_stack = true
//! ```

use crate::call_config::{self, CallConfig};
use crate::call_descriptor::simple_type_name;
use crate::time_unit::TimeUnit;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Configuration attached to a type, method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugLog {
    /// Minimum duration, in `time_unit`, before the exit line is logged
    pub threshold: u64,
    /// `"mill"`, `"micro"` or `"nano"`; anything else means milliseconds
    pub time_unit: String,
    /// Dump the stack after every call
    pub show_stack: bool,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self {
            threshold: 0,
            time_unit: TimeUnit::Milli.marker_name().to_string(),
            show_stack: false,
        }
    }
}

impl DebugLog {
    pub fn new(threshold: u64, time_unit: impl Into<String>, show_stack: bool) -> Self {
        Self {
            threshold,
            time_unit: time_unit.into(),
            show_stack,
        }
    }

    /// The resolved configuration this marker stands for
    pub fn config(&self) -> CallConfig {
        CallConfig::new(
            self.threshold,
            TimeUnit::from_marker(&self.time_unit),
            self.show_stack,
        )
    }
}

impl From<&DebugLog> for CallConfig {
    fn from(marker: &DebugLog) -> Self {
        marker.config()
    }
}

/// Key under which a method marker is stored: `Type::method`
pub fn method_key(type_name: &str, method_name: &str) -> String {
    format!("{}::{}", simple_type_name(type_name), method_name)
}

/// Markers for types and methods
///
/// Type names are matched by their simple name, so `app::Calculator` and
/// `Calculator` share one marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerRegistry {
    /// Type-level markers keyed by simple type name
    pub types: BTreeMap<String, DebugLog>,
    /// Method-level markers keyed by `Type::method`
    pub methods: BTreeMap<String, DebugLog>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load markers from a TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use debuglog::marker::MarkerRegistry;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let registry = MarkerRegistry::from_file("debuglog.toml")?;
    /// println!("{} marked types", registry.types.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid marker file {}", path.display()))
    }

    /// Load markers from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let registry: Self = toml::from_str(content).context("Failed to parse TOML")?;
        tracing::debug!(
            types = registry.types.len(),
            methods = registry.methods.len(),
            "loaded marker registry"
        );
        Ok(registry)
    }

    /// Attach a marker to every method of a type
    pub fn mark_type(&mut self, type_name: &str, marker: DebugLog) -> &mut Self {
        self.types
            .insert(simple_type_name(type_name).to_string(), marker);
        self
    }

    /// Attach a marker to one method
    pub fn mark_method(&mut self, type_name: &str, method_name: &str, marker: DebugLog) -> &mut Self {
        self.methods.insert(method_key(type_name, method_name), marker);
        self
    }

    pub fn type_marker(&self, type_name: &str) -> Option<&DebugLog> {
        self.types.get(simple_type_name(type_name))
    }

    pub fn method_marker(&self, type_name: &str, method_name: &str) -> Option<&DebugLog> {
        self.methods.get(&method_key(type_name, method_name))
    }

    /// Whether calls to `type_name::method_name` are intercepted
    ///
    /// A call is intercepted when the method is marked or its declaring type
    /// is marked.
    pub fn is_marked(&self, type_name: &str, method_name: &str) -> bool {
        self.method_marker(type_name, method_name).is_some() || self.type_marker(type_name).is_some()
    }

    /// Effective configuration for `type_name::method_name`
    pub fn config_for(&self, type_name: &str, method_name: &str) -> CallConfig {
        let on_type = self.type_marker(type_name).map(DebugLog::config);
        let on_method = self.method_marker(type_name, method_name).map(DebugLog::config);
        call_config::resolve(on_type.as_ref(), on_method.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_defaults() {
        let marker = DebugLog::default();
        assert_eq!(marker.threshold, 0);
        assert_eq!(marker.time_unit, "mill");
        assert!(!marker.show_stack);
        assert_eq!(marker.config(), CallConfig::default());
    }

    #[test]
    fn test_marker_unknown_unit_is_milli() {
        let marker = DebugLog::new(3, "hours", false);
        assert_eq!(marker.config().unit, TimeUnit::Milli);
    }

    #[test]
    fn test_parse_registry() {
        let toml = r#"
            [types.Calculator]
            threshold = 1

            [methods."Calculator::add"]
            threshold = 500
            time_unit = "micro"
            show_stack = true
        "#;

        let registry = MarkerRegistry::from_toml_str(toml).unwrap();

        assert_eq!(registry.types.len(), 1);
        assert_eq!(registry.methods.len(), 1);
        assert_eq!(registry.types["Calculator"].time_unit, "mill");
        assert_eq!(
            registry.config_for("Calculator", "add"),
            CallConfig::new(500, TimeUnit::Micro, true)
        );
        assert_eq!(
            registry.config_for("Calculator", "sub"),
            CallConfig::new(1, TimeUnit::Milli, false)
        );
    }

    #[test]
    fn test_parse_empty_registry() {
        let registry = MarkerRegistry::from_toml_str("").unwrap();
        assert!(registry.types.is_empty());
        assert!(registry.methods.is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let toml = r#"
            [types.Calculator]
            treshold = 1
        "#;
        assert!(MarkerRegistry::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_parse_rejects_negative_threshold() {
        let toml = r#"
            [types.Calculator]
            threshold = -1
        "#;
        assert!(MarkerRegistry::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_is_marked_by_type_or_method() {
        let mut registry = MarkerRegistry::new();
        registry
            .mark_type("app::Calculator", DebugLog::default())
            .mark_method("Parser", "parse", DebugLog::new(2, "nano", false));

        assert!(registry.is_marked("Calculator", "anything"));
        assert!(registry.is_marked("other::Calculator", "add"));
        assert!(registry.is_marked("Parser", "parse"));
        assert!(!registry.is_marked("Parser", "tokenize"));
        assert!(!registry.is_marked("Lexer", "parse"));
    }

    #[test]
    fn test_config_for_unmarked_call_is_default() {
        let registry = MarkerRegistry::new();
        assert_eq!(registry.config_for("Lexer", "next"), CallConfig::default());
    }

    #[test]
    fn test_method_marker_wins_without_merging() {
        let mut registry = MarkerRegistry::new();
        registry
            .mark_type("Calculator", DebugLog::new(10, "nano", true))
            .mark_method("Calculator", "add", DebugLog::default());

        let config = registry.config_for("Calculator", "add");
        assert_eq!(config, CallConfig::default());
    }

    #[test]
    fn test_method_key_uses_simple_name() {
        assert_eq!(method_key("app::math::Calculator", "add"), "Calculator::add");
    }

    #[test]
    fn test_from_file_missing() {
        let err = MarkerRegistry::from_file("/nonexistent/debuglog.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
