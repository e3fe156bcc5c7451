//! debuglog - call-boundary logging for marked calls
//!
//! This library logs the entry of a call (method name and arguments), times
//! it, and logs its exit (elapsed time and return value) when the elapsed
//! time, converted into the configured unit, reaches the configured threshold.
//! Whatever attaches the interceptor to call sites builds a
//! [`CallDescriptor`], resolves a [`CallConfig`] (for example through a
//! [`MarkerRegistry`]) and runs the call through an [`Interceptor`].

pub mod call_config;
pub mod call_descriptor;
pub mod cli;
pub mod formatter;
pub mod interceptor;
pub mod marker;
pub mod sections;
pub mod sink;
pub mod time_unit;
pub mod value;

pub use call_config::{resolve, CallConfig, ConfigError};
pub use call_descriptor::{designate_main_thread, CallDescriptor};
pub use interceptor::{is_enabled, set_enabled, Interceptor, InvocationResult};
pub use marker::{DebugLog, MarkerRegistry};
pub use sections::{NoopSections, SectionError, SectionTracer, TracingSections};
pub use sink::{Level, LogSink, MemorySink, SinkError, TracingSink};
pub use time_unit::TimeUnit;
pub use value::{LogValue, ToLogValue};
