//! Entry and exit line rendering
//!
//! ```text
//! ⇢ add(a=2, b=3) [Thread:"worker-1"]
//! ⇠ add [1]ms = 5
//! ```

use crate::call_descriptor::CallDescriptor;
use crate::time_unit::TimeUnit;
use crate::value::LogValue;
use std::fmt::Write;

/// Arguments rendered before the list is cut short with `...`
pub const MAX_LOGGED_ARGS: usize = 10;

/// Prefix of entry lines
pub const ENTRY_ARROW: &str = "⇢ ";

/// Prefix of exit lines
pub const EXIT_ARROW: &str = "⇠ ";

/// Render the line logged when a call starts
///
/// At most [`MAX_LOGGED_ARGS`] arguments are rendered; longer argument lists
/// end in `...`. Calls off the main thread name their thread.
pub fn entry_message(call: &CallDescriptor) -> String {
    let mut line = String::from(ENTRY_ARROW);
    line.push_str(call.method_name());
    line.push('(');

    for (i, param) in call.parameters().iter().take(MAX_LOGGED_ARGS).enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        // Writing into a String cannot fail
        let _ = write!(line, "{}={}", param.name, param.value);
    }
    if call.parameters().len() > MAX_LOGGED_ARGS {
        line.push_str("...");
    }
    line.push(')');

    if !call.is_main_thread() {
        let _ = write!(line, " [Thread:\"{}\"]", call.thread_name());
    }

    line
}

/// Name of the trace section opened for a call: the entry line without its arrow
pub fn section_name(entry_line: &str) -> &str {
    entry_line.strip_prefix(ENTRY_ARROW).unwrap_or(entry_line)
}

/// Render the line logged when a call finishes
///
/// `elapsed` is already converted into `unit`. The return value is appended
/// only for calls that declare one and actually produced it.
pub fn exit_message(
    call: &CallDescriptor,
    elapsed: u64,
    unit: TimeUnit,
    value: Option<&LogValue>,
) -> String {
    let mut line = format!(
        "{}{} [{}]{}",
        EXIT_ARROW,
        call.method_name(),
        elapsed,
        unit.label()
    );

    if let (true, Some(value)) = (call.has_return_value(), value) {
        let _ = write!(line, " = {}", value);
    }

    line
}
