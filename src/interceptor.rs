//! Call interception
//!
//! The [`Interceptor`] wraps one call: it logs the entry line, opens a trace
//! section, times the call, closes the section, logs the exit line when the
//! converted duration clears the threshold, and optionally dumps the stack.
//!
//! Interception is transparent. The wrapped call's value is returned as is,
//! a panic is resumed after logging, and an `Err` from
//! [`Interceptor::intercept_result`] is handed back untouched. Sink and section
//! failures are swallowed, panics included, and so is a return value that
//! fails to render.
//!
//! # Example
//! ```
//! use debuglog::{CallConfig, CallDescriptor, Interceptor, MemorySink, TimeUnit};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let interceptor = Interceptor::new(Arc::clone(&sink));
//!
//! let call = CallDescriptor::new("Calculator", "add")
//!     .with_arg("a", &2)
//!     .with_arg("b", &3)
//!     .on_thread("main", true);
//! let config = CallConfig::new(0, TimeUnit::Milli, false);
//!
//! let sum = interceptor.intercept(&call, &config, || 2 + 3);
//!
//! assert_eq!(sum, 5);
//! assert_eq!(sink.messages()[0], "⇢ add(a=2, b=3)");
//! ```

use crate::call_config::CallConfig;
use crate::call_descriptor::CallDescriptor;
use crate::formatter;
use crate::sections::{SectionTracer, TracingSections};
use crate::sink::{Level, LogSink, TracingSink};
use crate::value::{LogValue, ToLogValue};
use std::any::Any;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn all interception logging on or off for the whole process
///
/// Takes effect for calls that start after the switch; a call already in
/// flight finishes the way it started.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
    tracing::debug!(enabled, "call logging toggled");
}

/// Whether interception logging is on (default `true`)
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// What exit logging knows about a finished call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// Rendered return value, `None` for calls that failed or return nothing
    pub value: Option<LogValue>,
    /// Wall-clock duration of the wrapped call
    pub elapsed_nanos: u64,
}

impl InvocationResult {
    pub fn new(value: Option<LogValue>, elapsed_nanos: u64) -> Self {
        Self {
            value,
            elapsed_nanos,
        }
    }
}

fn duration_nanos(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Run logging work that must not unwind into the intercepted call
fn contained<R>(what: &'static str, site: &str, work: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::warn!(
                site,
                panic = panic_message(payload.as_ref()),
                "{} panicked, ignoring",
                what
            );
            None
        }
    }
}

/// Wraps calls with entry/exit logging and timing
///
/// Cheap to share: clone it or put it behind an `Arc` and use it from any
/// thread.
#[derive(Clone)]
pub struct Interceptor {
    sink: Arc<dyn LogSink>,
    sections: Arc<dyn SectionTracer>,
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor").finish_non_exhaustive()
    }
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::new(TracingSink::new())
    }
}

impl Interceptor {
    /// Create an interceptor writing to `sink`, with `tracing` sections
    pub fn new<S: LogSink + 'static>(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
            sections: Arc::new(TracingSections::new()),
        }
    }

    /// Replace the section tracer
    pub fn with_sections<T: SectionTracer + 'static>(mut self, sections: T) -> Self {
        self.sections = Arc::new(sections);
        self
    }

    /// Run `invoke` as the call described by `call`
    ///
    /// A panic in `invoke` is timed and logged without a return value, then
    /// resumed. A `()` result logs no ` = value` even when the descriptor was
    /// not built with [`CallDescriptor::returns_nothing`].
    pub fn intercept<T, F>(&self, call: &CallDescriptor, config: &CallConfig, invoke: F) -> T
    where
        T: ToLogValue,
        F: FnOnce() -> T,
    {
        self.intercept_with(call, config, invoke, |value| match value.to_log_value() {
            LogValue::Absent if mem::size_of::<T>() == 0 => None,
            captured => Some(captured),
        })
    }

    /// Run a fallible `invoke` as the call described by `call`
    ///
    /// `Ok` values are logged as the return value. An `Err` is logged without
    /// one and returned unchanged.
    pub fn intercept_result<T, E, F>(
        &self,
        call: &CallDescriptor,
        config: &CallConfig,
        invoke: F,
    ) -> Result<T, E>
    where
        T: ToLogValue,
        F: FnOnce() -> Result<T, E>,
    {
        self.intercept_with(call, config, invoke, |outcome| {
            outcome.as_ref().ok().map(ToLogValue::to_log_value)
        })
    }

    /// Run `invoke` and let `capture` decide which return value gets logged
    ///
    /// `capture` returning `None` logs the exit line without ` = value`, and so
    /// does a `capture` that panics.
    pub fn intercept_with<R, F, C>(
        &self,
        call: &CallDescriptor,
        config: &CallConfig,
        invoke: F,
        capture: C,
    ) -> R
    where
        F: FnOnce() -> R,
        C: FnOnce(&R) -> Option<LogValue>,
    {
        if !is_enabled() {
            return invoke();
        }

        self.enter(call);

        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(invoke));
        let elapsed_nanos = duration_nanos(start.elapsed());

        let value = match outcome.as_ref() {
            Ok(returned) => contained("return value capture", call.method_name(), || {
                capture(returned)
            })
            .flatten(),
            Err(_) => None,
        };
        self.exit(call, config, &InvocationResult::new(value, elapsed_nanos));

        match outcome {
            Ok(value) => value,
            Err(payload) => {
                tracing::trace!(method = call.method_name(), "resuming panic of intercepted call");
                panic::resume_unwind(payload)
            }
        }
    }

    /// Log the entry line and open the call's trace section
    pub fn enter(&self, call: &CallDescriptor) {
        let line = formatter::entry_message(call);
        self.write(call.tag(), &line, Level::Verbose);

        let begun = contained("section tracer", call.method_name(), || {
            self.sections.begin_section(formatter::section_name(&line))
        });
        if let Some(Err(e)) = begun {
            tracing::debug!(error = %e, method = call.method_name(), "could not begin section");
        }
    }

    /// Close the call's trace section and log the exit line
    ///
    /// The exit line is only written when the duration, converted into the
    /// configured unit, is at least the configured threshold. The stack dump
    /// for `show_stack` does not depend on the threshold.
    pub fn exit(&self, call: &CallDescriptor, config: &CallConfig, result: &InvocationResult) {
        let ended = contained("section tracer", call.method_name(), || {
            self.sections.end_section()
        });
        if let Some(Err(e)) = ended {
            tracing::debug!(error = %e, method = call.method_name(), "could not end section");
        }

        let elapsed = config.unit.scale(result.elapsed_nanos);
        if elapsed >= config.threshold {
            let line = contained("exit formatting", call.method_name(), || {
                formatter::exit_message(call, elapsed, config.unit, result.value.as_ref())
            });
            if let Some(line) = line {
                self.write(call.tag(), &line, Level::Verbose);
            }
        } else {
            tracing::trace!(
                method = call.method_name(),
                elapsed,
                threshold = config.threshold,
                unit = config.unit.label(),
                "below threshold, exit line suppressed"
            );
        }

        if config.show_stack {
            self.dump_stack(call);
        }
    }

    fn dump_stack(&self, call: &CallDescriptor) {
        let message = contained("stack capture", call.method_name(), || {
            let trace = backtrace::Backtrace::new();
            format!("call stack of {}:\n{:?}", call.method_name(), trace)
        });
        if let Some(message) = message {
            self.write(call.tag(), &message, Level::Debug);
        }
    }

    fn write(&self, tag: &str, message: &str, level: Level) {
        match contained("log sink", tag, || self.sink.write(tag, message, level)) {
            Some(Err(e)) => tracing::warn!(error = %e, tag, "log sink rejected line"),
            Some(Ok(())) | None => {}
        }
    }
}
