//! Where the built-in loggers write to.
//!
//! Output goes to stderr, unless the current thread is inside [`capture`].

use std::cell::RefCell;
use std::io::Write;

thread_local! {
    static CAPTURE: RefCell<Option<String>> = RefCell::new(None);
}

/// Writes `text` to the current sink.
pub fn emit(text: &str) {
    let captured = CAPTURE.with(|capture| match &mut *capture.borrow_mut() {
        Some(buffer) => {
            buffer.push_str(text);
            true
        }
        None => false,
    });
    if !captured {
        let stderr = std::io::stderr();
        let mut stderr = stderr.lock();
        // Nothing sensible to do if stderr is gone.
        let _ = stderr.write_all(text.as_bytes());
    }
}

/// Invokes `f`, returning both its result and everything emitted on this
/// thread while it ran.
///
/// Captures nest: an inner `capture` takes the output of its own closure
/// only.
pub fn capture<R, F: FnOnce() -> R>(f: F) -> (R, String) {
    let outer = CAPTURE.with(|capture| capture.borrow_mut().replace(String::new()));
    let restore = Restore(Some(outer));
    let result = f();
    let captured = restore.finish();
    (result, captured)
}

struct Restore(Option<Option<String>>);

impl Restore {
    fn finish(mut self) -> String {
        let outer = self.0.take().unwrap_or_default();
        CAPTURE
            .with(|capture| std::mem::replace(&mut *capture.borrow_mut(), outer))
            .unwrap_or_default()
    }
}

impl Drop for Restore {
    // Only reached with a value left when `f` panicked.
    fn drop(&mut self) {
        if let Some(outer) = self.0.take() {
            CAPTURE.with(|capture| *capture.borrow_mut() = outer);
        }
    }
}
