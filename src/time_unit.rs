//! Duration units for exit logging
//!
//! Elapsed time is always measured in nanoseconds and converted into the unit
//! configured by the marker before it is compared against the threshold and
//! printed. Conversion truncates, so 1,999,999 ns is reported as `[1]ms`.

use std::fmt;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;

/// Unit a marker reports elapsed time in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeUnit {
    /// Milliseconds (default)
    #[default]
    Milli,
    /// Microseconds
    Micro,
    /// Nanoseconds
    Nano,
}

impl TimeUnit {
    /// Parse the unit spelling used by markers
    ///
    /// Markers spell units as `"mill"`, `"micro"` and `"nano"`. Anything else
    /// is treated as milliseconds rather than rejected.
    ///
    /// # Example
    /// ```
    /// use debuglog::time_unit::TimeUnit;
    ///
    /// assert_eq!(TimeUnit::from_marker("micro"), TimeUnit::Micro);
    /// assert_eq!(TimeUnit::from_marker("fortnight"), TimeUnit::Milli);
    /// ```
    pub fn from_marker(spelling: &str) -> Self {
        match spelling {
            "mill" => TimeUnit::Milli,
            "micro" => TimeUnit::Micro,
            "nano" => TimeUnit::Nano,
            other => {
                tracing::debug!(unit = other, "unknown time unit, using milliseconds");
                TimeUnit::Milli
            }
        }
    }

    /// Marker spelling of this unit
    pub fn marker_name(self) -> &'static str {
        match self {
            TimeUnit::Milli => "mill",
            TimeUnit::Micro => "micro",
            TimeUnit::Nano => "nano",
        }
    }

    /// Label printed after the bracketed duration
    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Milli => "ms",
            TimeUnit::Micro => "μs",
            TimeUnit::Nano => "ns",
        }
    }

    /// Convert nanoseconds into this unit, truncating
    pub fn scale(self, elapsed_nanos: u64) -> u64 {
        match self {
            TimeUnit::Milli => elapsed_nanos / NANOS_PER_MILLI,
            TimeUnit::Micro => elapsed_nanos / NANOS_PER_MICRO,
            TimeUnit::Nano => elapsed_nanos,
        }
    }

    /// Convert nanoseconds into this unit and pair the value with its label
    ///
    /// # Example
    /// ```
    /// use debuglog::time_unit::TimeUnit;
    ///
    /// assert_eq!(TimeUnit::Milli.convert(2_500_000), (2, "ms"));
    /// assert_eq!(TimeUnit::Micro.convert(2_500_000), (2500, "μs"));
    /// ```
    pub fn convert(self, elapsed_nanos: u64) -> (u64, &'static str) {
        (self.scale(elapsed_nanos), self.label())
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
