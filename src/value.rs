//! Loggable values
//!
//! Arguments and return values are captured as a [`LogValue`], a closed set of
//! three shapes: absent, a sequence of values, or plain text. Rendering is the
//! same for arguments and return values.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// A captured argument or return value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogValue {
    /// Missing value, rendered as `null`
    Absent,
    /// Array-like value, rendered as `[a, b, c]`
    Sequence(Vec<LogValue>),
    /// Anything else, already rendered
    Text(String),
}

impl LogValue {
    /// Capture a value through its `Display` implementation
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        LogValue::Text(value.to_string())
    }

    /// Capture a value through its `Debug` implementation
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        LogValue::Text(format!("{:?}", value))
    }

    /// Capture an iterator of loggable items as a sequence
    pub fn sequence<'a, T, I>(items: I) -> Self
    where
        T: ToLogValue + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        LogValue::Sequence(items.into_iter().map(ToLogValue::to_log_value).collect())
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Absent => f.write_str("null"),
            LogValue::Text(text) => f.write_str(text),
            LogValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Types that can be captured as a [`LogValue`]
pub trait ToLogValue {
    fn to_log_value(&self) -> LogValue;
}

impl ToLogValue for LogValue {
    fn to_log_value(&self) -> LogValue {
        self.clone()
    }
}

macro_rules! display_log_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToLogValue for $ty {
                fn to_log_value(&self) -> LogValue {
                    LogValue::display(self)
                }
            }
        )*
    };
}

display_log_value!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, str,
    String,
);

impl ToLogValue for () {
    fn to_log_value(&self) -> LogValue {
        LogValue::Absent
    }
}

impl<T: ToLogValue + ?Sized> ToLogValue for &T {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: ToLogValue + ?Sized> ToLogValue for &mut T {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: ToLogValue + ?Sized> ToLogValue for Box<T> {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: ToLogValue + ?Sized> ToLogValue for Rc<T> {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: ToLogValue + ?Sized> ToLogValue for Arc<T> {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: ToLogValue + ?Sized + ToOwned> ToLogValue for Cow<'_, T> {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: ToLogValue> ToLogValue for Option<T> {
    fn to_log_value(&self) -> LogValue {
        match self {
            Some(value) => value.to_log_value(),
            None => LogValue::Absent,
        }
    }
}

impl<T: ToLogValue> ToLogValue for [T] {
    fn to_log_value(&self) -> LogValue {
        LogValue::sequence(self)
    }
}

impl<T: ToLogValue, const N: usize> ToLogValue for [T; N] {
    fn to_log_value(&self) -> LogValue {
        LogValue::sequence(self)
    }
}

impl<T: ToLogValue> ToLogValue for Vec<T> {
    fn to_log_value(&self) -> LogValue {
        LogValue::sequence(self)
    }
}

impl<T: ToLogValue> ToLogValue for VecDeque<T> {
    fn to_log_value(&self) -> LogValue {
        LogValue::sequence(self)
    }
}

impl<T: ToLogValue> ToLogValue for BTreeSet<T> {
    fn to_log_value(&self) -> LogValue {
        LogValue::sequence(self)
    }
}

impl<T: ToLogValue, S> ToLogValue for HashSet<T, S> {
    fn to_log_value(&self) -> LogValue {
        LogValue::sequence(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_renders_null() {
        assert_eq!(LogValue::Absent.to_string(), "null");
        assert_eq!(None::<i32>.to_log_value().to_string(), "null");
    }

    #[test]
    fn test_some_renders_inner_value() {
        assert_eq!(Some(7).to_log_value().to_string(), "7");
    }

    #[test]
    fn test_primitives_use_display() {
        assert_eq!(42u8.to_log_value().to_string(), "42");
        assert_eq!((-3i64).to_log_value().to_string(), "-3");
        assert_eq!(true.to_log_value().to_string(), "true");
        assert_eq!('x'.to_log_value().to_string(), "x");
        assert_eq!(1.5f64.to_log_value().to_string(), "1.5");
    }

    #[test]
    fn test_strings_are_not_quoted() {
        assert_eq!("hello".to_log_value().to_string(), "hello");
        assert_eq!(String::from("world").to_log_value().to_string(), "world");
    }

    #[test]
    fn test_sequences_render_in_brackets() {
        assert_eq!(vec![1, 2, 3].to_log_value().to_string(), "[1, 2, 3]");
        assert_eq!([4u8, 5].to_log_value().to_string(), "[4, 5]");
        assert_eq!(Vec::<i32>::new().to_log_value().to_string(), "[]");
    }

    #[test]
    fn test_sequences_recurse() {
        let nested = vec![vec![1, 2], vec![], vec![3]];
        assert_eq!(nested.to_log_value().to_string(), "[[1, 2], [], [3]]");

        let with_gaps = vec![Some("a"), None, Some("c")];
        assert_eq!(with_gaps.to_log_value().to_string(), "[a, null, c]");
    }

    #[test]
    fn test_slice_and_references() {
        let data = [10, 20];
        let slice: &[i32] = &data;
        assert_eq!(slice.to_log_value().to_string(), "[10, 20]");
        assert_eq!((&&5).to_log_value().to_string(), "5");
    }

    #[test]
    fn test_smart_pointers_are_transparent() {
        assert_eq!(Box::new(1).to_log_value().to_string(), "1");
        assert_eq!(Arc::new("shared").to_log_value().to_string(), "shared");
        assert_eq!(Rc::new(vec![1]).to_log_value().to_string(), "[1]");
    }

    #[test]
    fn test_unit_is_absent() {
        assert_eq!(().to_log_value(), LogValue::Absent);
    }

    #[test]
    fn test_debug_capture_for_user_types() {
        #[derive(Debug)]
        struct Point {
            x: i32,
        }

        let value = LogValue::debug(&Point { x: 1 });
        assert_eq!(value.to_string(), "Point { x: 1 }");
    }

    #[test]
    fn test_btreeset_is_ordered_sequence() {
        let set: BTreeSet<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(set.to_log_value().to_string(), "[1, 2, 3]");
    }
}
