//! Logging callbacks invoked around intercepted calls, and the built-in
//! implementations used by default.

use crate::output::emit;
use crate::target::Target;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::fmt::Debug;

/// Called with the arguments of an intercepted call, before the original
/// runs.
pub type ArgsFn = dyn Fn(&Target, &Arguments<'_>) + Send + Sync;

/// Called with the value an intercepted call returned.
pub type ReturnFn = dyn Fn(&Target, &dyn Debug) + Send + Sync;

/// Called with the error or panic an intercepted call raised.
pub type FailureFn = dyn Fn(&Target, &Failure<'_>) + Send + Sync;

/// One logged value: an argument, a return value or an error.
///
/// Values whose type implements `Serialize` and `Debug` keep both views.
/// Values that only implement `Debug` are rendered as JSON strings holding
/// their `Debug` output, and anything else shows up as `<opaque TYPE>`.
#[derive(Clone, Copy)]
pub struct Loggable<'a> {
    repr: Repr<'a>,
}

#[derive(Clone, Copy)]
enum Repr<'a> {
    Serialize(&'a dyn SerializeDebug),
    Debug(&'a dyn Debug),
    Opaque(&'static str),
}

trait SerializeDebug: Debug {
    fn to_json(&self) -> serde_json::Result<Value>;
}

impl<T: Serialize + Debug> SerializeDebug for T {
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl<'a> Loggable<'a> {
    #[doc(hidden)]
    pub fn serialized<T: Serialize + Debug>(value: &'a T) -> Self {
        Loggable {
            repr: Repr::Serialize(value),
        }
    }

    #[doc(hidden)]
    pub fn debug<T: Debug>(value: &'a T) -> Self {
        Loggable {
            repr: Repr::Debug(value),
        }
    }

    #[doc(hidden)]
    pub fn opaque(type_name: &'static str) -> Self {
        Loggable {
            repr: Repr::Opaque(type_name),
        }
    }

    /// The JSON form of the value.
    ///
    /// Serializable values become their serde representation, so `'c'` is
    /// `"c"` and `Some(3)` is `3`. Everything else, including values whose
    /// serialization fails, becomes a JSON string of the `Debug` rendering.
    pub fn to_json(&self) -> Value {
        match self.repr {
            Repr::Serialize(value) => value
                .to_json()
                .unwrap_or_else(|_| Value::String(format!("{:?}", value))),
            _ => Value::String(format!("{:?}", self)),
        }
    }
}

impl Debug for Loggable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            Repr::Serialize(value) => Debug::fmt(value, f),
            Repr::Debug(value) => Debug::fmt(value, f),
            Repr::Opaque(type_name) => write!(f, "<opaque {}>", type_name),
        }
    }
}

/// The positional arguments of an intercepted call, in call order.
///
/// A `self` receiver is not part of the arguments.
#[derive(Clone, Copy)]
pub struct Arguments<'a> {
    values: &'a [Loggable<'a>],
}

impl<'a> Arguments<'a> {
    #[doc(hidden)]
    pub fn new(values: &'a [Loggable<'a>]) -> Self {
        Arguments { values }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` for calls without arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the arguments.
    pub fn iter(&self) -> impl Iterator<Item = Loggable<'a>> + 'a {
        self.values.iter().copied()
    }

    /// Renders the arguments as a JSON array, see [`Loggable::to_json`].
    pub fn to_json(&self) -> Value {
        Value::Array(self.values.iter().map(Loggable::to_json).collect())
    }
}

impl Debug for Arguments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

/// Something an intercepted call raised instead of returning normally.
pub enum Failure<'a> {
    /// The `Err` variant of a returned `Result`.
    Error {
        /// Type name of the error value.
        type_name: &'a str,
        /// The error value.
        error: &'a dyn Debug,
    },

    /// A panic unwinding out of the call.
    Panic {
        /// The panic payload, as passed to `resume_unwind` afterwards.
        payload: &'a (dyn Any + Send),
    },
}

impl Failure<'_> {
    /// The error type name, or `"panic"`.
    pub fn kind(&self) -> &str {
        match self {
            Failure::Error { type_name, .. } => *type_name,
            Failure::Panic { .. } => "panic",
        }
    }

    /// A human-readable message: the `Debug` rendering of an error, or the
    /// message of a panic.
    pub fn message(&self) -> String {
        match self {
            Failure::Error { error, .. } => format!("{:?}", error),
            Failure::Panic { payload } => {
                if let Some(message) = payload.downcast_ref::<&'static str>() {
                    (*message).to_owned()
                } else if let Some(message) = payload.downcast_ref::<String>() {
                    message.clone()
                } else {
                    "Box<dyn Any>".to_owned()
                }
            }
        }
    }
}

impl Debug for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("kind", &self.kind())
            .field("message", &self.message())
            .finish()
    }
}

/// The default arguments logger. Prints `in TARGET : Params :` followed by a
/// pretty-printed dump of the arguments.
pub fn dump_args(target: &Target, args: &Arguments<'_>) {
    emit(&format!("in {} : Params :\n{:#?}\n", target, args));
}

/// Prints `Calling TARGET: args=[...]` with the arguments as a JSON array.
pub fn json_args(target: &Target, args: &Arguments<'_>) {
    emit(&format!("Calling {}: args={}\n", target, args.to_json()));
}

/// The default return logger. Prints `return value of TARGET is :` followed
/// by a pretty-printed dump of the value.
pub fn dump_return(target: &Target, value: &dyn Debug) {
    emit(&format!("return value of {} is :\n{:#?}\n", target, value));
}

/// The default exception logger. Prints the kind and message of the failure
/// and the stack at the point it was observed.
pub fn dump_failure(target: &Target, failure: &Failure<'_>) {
    let backtrace = backtrace::Backtrace::new();
    emit(&format!(
        "exception in {} : {} : {}\n{:?}\n",
        target,
        failure.kind(),
        failure.message(),
        backtrace
    ));
}

/// Prints the stack of an intercepted call on entry.
pub fn print_backtrace(target: &Target) {
    let backtrace = backtrace::Backtrace::new();
    emit(&format!("backtrace of {} :\n{:?}\n", target, backtrace));
}
