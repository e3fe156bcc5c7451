//! Effective configuration for one intercepted call site
//!
//! A call site can be configured at two levels: on the method itself or on
//! the type that declares it. The method level always wins in full; there is
//! no field-by-field merge between the two.

use crate::time_unit::TimeUnit;
use thiserror::Error;

/// Errors raised while resolving a call site's configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no marker configuration on the declaring type or the method")]
    Missing,
}

/// Resolved threshold, unit and stack-dump flag for a call site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallConfig {
    /// Minimum converted duration before the exit line is logged, in `unit`
    pub threshold: u64,
    /// Unit used for both the threshold comparison and the exit line
    pub unit: TimeUnit,
    /// Dump the caller's stack after every intercepted call
    pub show_stack: bool,
}

impl CallConfig {
    pub fn new(threshold: u64, unit: TimeUnit, show_stack: bool) -> Self {
        Self {
            threshold,
            unit,
            show_stack,
        }
    }

    /// Whether a call that ran for `elapsed_nanos` clears the threshold
    ///
    /// The comparison happens after conversion into the configured unit, so
    /// a threshold of 1 with [`TimeUnit::Milli`] needs at least 1,000,000 ns.
    pub fn exceeds_threshold(&self, elapsed_nanos: u64) -> bool {
        self.unit.scale(elapsed_nanos) >= self.threshold
    }
}

/// Pick the configuration for a call site, failing when neither level has one
pub fn try_resolve(
    type_level: Option<&CallConfig>,
    method_level: Option<&CallConfig>,
) -> Result<CallConfig, ConfigError> {
    method_level
        .or(type_level)
        .copied()
        .ok_or(ConfigError::Missing)
}

/// Pick the configuration for a call site
///
/// Method level, then type level, then [`CallConfig::default`].
///
/// # Example
/// ```
/// use debuglog::call_config::{resolve, CallConfig};
/// use debuglog::time_unit::TimeUnit;
///
/// let on_type = CallConfig::new(5, TimeUnit::Milli, true);
/// let on_method = CallConfig::new(100, TimeUnit::Micro, false);
///
/// assert_eq!(resolve(Some(&on_type), Some(&on_method)), on_method);
/// assert_eq!(resolve(Some(&on_type), None), on_type);
/// assert_eq!(resolve(None, None), CallConfig::default());
/// ```
pub fn resolve(type_level: Option<&CallConfig>, method_level: Option<&CallConfig>) -> CallConfig {
    try_resolve(type_level, method_level).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "using default call configuration");
        CallConfig::default()
    })
}
