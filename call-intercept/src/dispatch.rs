//! Runtime support for the wrappers generated by `#[interceptable]`.

use crate::loggers::{self, Arguments, Failure, Loggable};
use crate::registry::{self, Record};
use crate::target::Target;
use std::any::type_name;
use std::cell::Cell;
use serde::Serialize;
use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

thread_local! {
    // Set while a logging callback runs on this thread.
    static IN_LOGGER: Cell<bool> = Cell::new(false);
}

fn quietly<R, F: FnOnce() -> R>(f: F) -> R {
    struct Reset(bool);
    impl Drop for Reset {
        fn drop(&mut self) {
            IN_LOGGER.with(|flag| flag.set(self.0));
        }
    }

    let _reset = Reset(IN_LOGGER.with(|flag| flag.replace(true)));
    f()
}

/// Called by generated wrappers on entry.
///
/// Returns `None` if the target is not intercepted, in which case the
/// wrapper calls the original directly. Otherwise the arguments (and the
/// backtrace, if enabled) have been logged and the returned frame does the
/// rest.
pub fn enter(target: &'static Target, args: &[Loggable<'_>]) -> Option<Frame> {
    if IN_LOGGER.with(Cell::get) {
        return None;
    }
    let record = registry::find(target)?;
    quietly(|| {
        if let Some(log) = &record.loggers.args {
            log(target, &Arguments::new(args));
        }
        if record.loggers.backtrace {
            loggers::print_backtrace(target);
        }
    });
    Some(Frame { target, record })
}

/// One intercepted call in flight.
pub struct Frame {
    target: &'static Target,
    record: Arc<Record>,
}

impl Frame {
    /// Runs the original. A panic is logged and then resumed with the same
    /// payload.
    pub fn invoke<R, F: FnOnce() -> R>(&self, original: F) -> R {
        match panic::catch_unwind(AssertUnwindSafe(original)) {
            Ok(result) => result,
            Err(payload) => {
                self.failed(&Failure::Panic { payload: &*payload });
                panic::resume_unwind(payload)
            }
        }
    }

    /// Logs a normal return value.
    pub fn returned(&self, value: &dyn Debug) {
        if !self.record.is_active() {
            return;
        }
        if let Some(log) = &self.record.loggers.returns {
            quietly(|| log(self.target, value));
        }
    }

    /// Logs the `Err` of a returned `Result`.
    pub fn raised(&self, type_name: &str, error: &dyn Debug) {
        self.failed(&Failure::Error { type_name, error });
    }

    fn failed(&self, failure: &Failure<'_>) {
        if !self.record.is_active() {
            return;
        }
        if let Some(log) = &self.record.loggers.failures {
            quietly(|| log(self.target, failure));
        }
    }
}

/// Borrows a value for logging.
///
/// Generated code calls `(&&&Probe(&value)).loggable()`, and method
/// resolution picks the first of [`SerializeArg`], [`DebugArg`] and
/// [`OpaqueArg`] whose bounds the value meets.
pub struct Probe<'a, T>(pub &'a T);

/// Picked when the value implements `Serialize` and `Debug`.
pub trait SerializeArg<'a> {
    /// The value, with its serde representation available for JSON.
    fn loggable(&self) -> Loggable<'a>;
}

impl<'a, T: Serialize + Debug> SerializeArg<'a> for &&Probe<'a, T> {
    fn loggable(&self) -> Loggable<'a> {
        Loggable::serialized(self.0)
    }
}

/// Picked when the value implements `Debug` only.
pub trait DebugArg<'a> {
    /// The value itself.
    fn loggable(&self) -> Loggable<'a>;
}

impl<'a, T: Debug> DebugArg<'a> for &Probe<'a, T> {
    fn loggable(&self) -> Loggable<'a> {
        Loggable::debug(self.0)
    }
}

/// Picked for everything else; only the type name gets logged.
pub trait OpaqueArg<'a> {
    /// A placeholder naming the type.
    fn loggable(&self) -> Loggable<'a>;
}

impl<'a, T> OpaqueArg<'a> for Probe<'a, T> {
    fn loggable(&self) -> Loggable<'a> {
        Loggable::opaque(type_name::<T>())
    }
}

/// Moved into the closure holding the original, which makes it `FnOnce` so
/// it may return borrows of the arguments it captured.
pub struct Token;

/// Type name of the value behind `value`.
pub fn type_name_of<T>(_value: &T) -> &'static str {
    type_name::<T>()
}
