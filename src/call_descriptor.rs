//! Identity and arguments of one intercepted call
//!
//! A [`CallDescriptor`] is what the attachment layer hands to the interceptor
//! instead of a reflective join point: the declaring type, the method name,
//! the named argument values, whether the method returns anything, and the
//! thread it runs on.

use crate::value::{LogValue, ToLogValue};
use std::sync::OnceLock;
use std::thread::{self, ThreadId};

static MAIN_THREAD: OnceLock<ThreadId> = OnceLock::new();

/// Designate the calling thread as the process main thread
///
/// Calls on the main thread are logged without a `[Thread:"..."]` suffix.
/// Only the first designation sticks; returns `false` if another thread was
/// already designated.
pub fn designate_main_thread() -> bool {
    let current = thread::current().id();
    *MAIN_THREAD.get_or_init(|| current) == current
}

/// Whether the calling thread is the main thread
///
/// Without an explicit designation the thread named `main` counts.
pub fn is_main_thread() -> bool {
    let current = thread::current();
    match MAIN_THREAD.get() {
        Some(id) => *id == current.id(),
        None => current.name() == Some("main"),
    }
}

/// Simple name used as the log tag for a declaring type
///
/// Module paths, generic arguments, slice brackets and reference sigils are
/// stripped. Anonymous segments such as `{{closure}}` resolve to the type
/// enclosing the function they were defined in; for a free function, which
/// has no such type, the function name is used instead.
///
/// # Example
/// ```
/// use debuglog::call_descriptor::simple_type_name;
///
/// assert_eq!(simple_type_name("app::billing::Invoice"), "Invoice");
/// assert_eq!(simple_type_name("app::Cache<alloc::string::String>"), "Cache");
/// assert_eq!(simple_type_name("app::Worker::run::{{closure}}"), "Worker");
/// assert_eq!(simple_type_name("[app::Item]"), "Item");
/// ```
pub fn simple_type_name(type_name: &str) -> &str {
    let trimmed = type_name
        .trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim_start_matches("dyn ")
        .trim_start_matches('[');
    let outer = cut_path(trimmed);

    let mut segments = outer.rsplit("::").filter(|segment| !segment.is_empty());
    match segments.next() {
        Some(last) if !is_anonymous(last) => return last,
        Some(_) => {}
        None => return outer,
    }

    let mut named = segments.filter(|segment| !is_anonymous(segment));
    match (named.next(), named.next()) {
        (Some(_function), Some(owner)) if is_type_like(owner) => owner,
        (Some(function), _) => function,
        (None, _) => outer,
    }
}

/// Cut a path at its generic arguments or array length
fn cut_path(path: &str) -> &str {
    match path.find(|c: char| matches!(c, '<' | ';' | ']')) {
        Some(idx) => path[..idx].trim_end(),
        None => path,
    }
}

fn is_anonymous(segment: &str) -> bool {
    segment.starts_with('{')
}

fn is_type_like(segment: &str) -> bool {
    segment.starts_with(|c: char| c.is_uppercase())
}

/// A named argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: LogValue,
}

/// Everything the interceptor knows about one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    declaring_type: String,
    method_name: String,
    parameters: Vec<Parameter>,
    has_return_value: bool,
    is_main_thread: bool,
    thread_name: String,
}

impl CallDescriptor {
    /// Describe a call on the current thread
    ///
    /// The call is assumed to return a value; use [`returns_nothing`] for
    /// unit-returning methods and constructors that should not log ` = value`.
    ///
    /// [`returns_nothing`]: CallDescriptor::returns_nothing
    pub fn new(declaring_type: impl Into<String>, method_name: impl Into<String>) -> Self {
        let current = thread::current();
        let thread_name = match current.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", current.id()),
        };

        Self {
            declaring_type: declaring_type.into(),
            method_name: method_name.into(),
            parameters: Vec::new(),
            has_return_value: true,
            is_main_thread: is_main_thread(),
            thread_name,
        }
    }

    /// Describe a call to a method declared on `T`
    pub fn for_type<T: ?Sized>(method_name: impl Into<String>) -> Self {
        Self::new(std::any::type_name::<T>(), method_name)
    }

    /// Append a named argument
    pub fn with_arg<V: ToLogValue + ?Sized>(mut self, name: impl Into<String>, value: &V) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            value: value.to_log_value(),
        });
        self
    }

    /// Mark the call as not producing a return value
    pub fn returns_nothing(mut self) -> Self {
        self.has_return_value = false;
        self
    }

    /// Override the thread the call is attributed to
    pub fn on_thread(mut self, thread_name: impl Into<String>, is_main_thread: bool) -> Self {
        self.thread_name = thread_name.into();
        self.is_main_thread = is_main_thread;
        self
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    pub fn parameter_values(&self) -> impl Iterator<Item = &LogValue> {
        self.parameters.iter().map(|p| &p.value)
    }

    pub fn has_return_value(&self) -> bool {
        self.has_return_value
    }

    pub fn is_main_thread(&self) -> bool {
        self.is_main_thread
    }

    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Log tag for this call, the simple name of the declaring type
    pub fn tag(&self) -> &str {
        simple_type_name(&self.declaring_type)
    }
}

/// Build a [`CallDescriptor`] from a type, a method name and argument bindings
///
/// Argument names come from the binding identifiers.
///
/// ```
/// use debuglog::call_descriptor;
///
/// struct Calculator;
///
/// let (a, b) = (2, 3);
/// let call = call_descriptor!(Calculator, "add", a, b);
/// assert_eq!(call.tag(), "Calculator");
/// assert_eq!(call.parameter_names().collect::<Vec<_>>(), ["a", "b"]);
/// ```
#[macro_export]
macro_rules! call_descriptor {
    ($ty:ty, $method:expr $(, $arg:ident)* $(,)?) => {
        $crate::call_descriptor::CallDescriptor::for_type::<$ty>($method)
            $(.with_arg(stringify!($arg), &$arg))*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Calculator;

    #[test]
    fn test_simple_type_name_strips_module_path() {
        assert_eq!(simple_type_name("a::b::c::Widget"), "Widget");
        assert_eq!(simple_type_name("Widget"), "Widget");
    }

    #[test]
    fn test_simple_type_name_strips_generics_and_references() {
        assert_eq!(simple_type_name("&app::Pool<u8>"), "Pool");
        assert_eq!(simple_type_name("&mut app::Pool<app::Item<u8>>"), "Pool");
        assert_eq!(simple_type_name("dyn app::Handler"), "Handler");
    }

    #[test]
    fn test_simple_type_name_resolves_anonymous_segments() {
        assert_eq!(simple_type_name("app::Server::start::{{closure}}"), "Server");
        assert_eq!(
            simple_type_name("app::Server::start::{{closure}}::{{closure}}"),
            "Server"
        );
        assert_eq!(simple_type_name("app::{{impl}}::Inner"), "Inner");
    }

    #[test]
    fn test_simple_type_name_closure_in_free_function() {
        assert_eq!(simple_type_name("app::bootstrap::{{closure}}"), "bootstrap");
        assert_eq!(simple_type_name("{{closure}}"), "{{closure}}");
    }

    #[test]
    fn test_simple_type_name_strips_slices_and_arrays() {
        assert_eq!(simple_type_name("[app::Item]"), "Item");
        assert_eq!(simple_type_name("&[app::Item]"), "Item");
        assert_eq!(simple_type_name("[app::Item; 4]"), "Item");
        assert_eq!(simple_type_name("&[app::Pool<u8>]"), "Pool");
    }

    #[test]
    fn test_for_type_uses_type_name() {
        let call = CallDescriptor::for_type::<Calculator>("add");
        assert!(call.declaring_type().ends_with("Calculator"));
        assert_eq!(call.tag(), "Calculator");
        assert_eq!(call.method_name(), "add");
    }

    #[test]
    fn test_with_arg_keeps_order() {
        let call = CallDescriptor::new("Calculator", "add")
            .with_arg("a", &2)
            .with_arg("b", &3);

        assert_eq!(call.parameter_names().collect::<Vec<_>>(), ["a", "b"]);
        let values: Vec<String> = call.parameter_values().map(|v| v.to_string()).collect();
        assert_eq!(values, ["2", "3"]);
    }

    #[test]
    fn test_defaults_to_returning_a_value() {
        let call = CallDescriptor::new("Calculator", "add");
        assert!(call.has_return_value());
        assert!(!call.returns_nothing().has_return_value());
    }

    #[test]
    fn test_on_thread_overrides_capture() {
        let call = CallDescriptor::new("Calculator", "add").on_thread("worker-1", false);
        assert_eq!(call.thread_name(), "worker-1");
        assert!(!call.is_main_thread());
    }

    #[test]
    fn test_captures_named_thread() {
        let call = thread::Builder::new()
            .name("io-7".to_string())
            .spawn(|| CallDescriptor::new("Disk", "read"))
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(call.thread_name(), "io-7");
        assert!(!call.is_main_thread());
    }

    #[test]
    fn test_designated_main_thread_sticks() {
        // The only test in this binary that designates a main thread
        thread::spawn(|| {
            assert!(designate_main_thread());
            assert!(is_main_thread());
            assert!(CallDescriptor::new("App", "run").is_main_thread());
        })
        .join()
        .unwrap();

        assert!(!designate_main_thread());
        assert!(!is_main_thread());
    }

    #[test]
    fn test_macro_binds_argument_names() {
        let name = "ada";
        let scores = vec![1, 2];
        let call = crate::call_descriptor!(Calculator, "score", name, scores);

        assert_eq!(call.tag(), "Calculator");
        assert_eq!(call.parameters().len(), 2);
        assert_eq!(call.parameters()[0].name, "name");
        assert_eq!(call.parameters()[1].value.to_string(), "[1, 2]");
    }

    #[test]
    fn test_macro_without_arguments() {
        let call = crate::call_descriptor!(Calculator, "reset").returns_nothing();
        assert!(call.parameters().is_empty());
        assert!(!call.has_return_value());
    }
}
