//! The set of targets compiled with `#[interceptable]`.
//!
//! Every generated wrapper declares its target here when the program is
//! loaded, which lets `Interception::install` check that a name refers to
//! something that can actually be intercepted.

use crate::error::{Error, Result};
use crate::target::{Key, Target};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

static CATALOGUE: Lazy<Mutex<HashMap<Key, &'static Target>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

// Only ever inserted into, so a panic while the lock was held cannot have
// left it half-updated.
fn catalogue() -> MutexGuard<'static, HashMap<Key, &'static Target>> {
    CATALOGUE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Declares a target. Called by code generated by `#[interceptable]`.
///
/// When two targets normalize to the same key the first one wins, and the
/// other one cannot be intercepted.
#[doc(hidden)]
pub fn declare(target: &'static Target) {
    let key = target.key().clone();
    let mut catalogue = catalogue();
    match catalogue.get(&key).copied() {
        Some(first) if std::ptr::eq(first, target) => {}
        Some(first) => tracing::warn!(
            name = %target,
            shadowed_by = %first,
            "interceptable target shares its name with another one and cannot be intercepted"
        ),
        None => {
            tracing::trace!(name = %target, "declared interceptable target");
            catalogue.insert(key, target);
        }
    }
}

/// Looks up a declared target.
pub fn lookup(owner: Option<&str>, member: &str) -> Result<&'static Target> {
    let key = Key::new(owner, member);
    let catalogue = catalogue();
    if let Some(target) = catalogue.get(&key) {
        return Ok(*target);
    }

    let message = match key.owner() {
        None => format!("no interceptable function `{}`", member),
        Some(owner) if catalogue.keys().any(|k| k.owner() == Some(owner)) => {
            format!("type `{}` has no interceptable method `{}`", owner, member)
        }
        Some(owner) => format!("no interceptable type `{}`", owner),
    };
    Err(Error::TargetNotFound(message))
}

/// Returns `true` if a target with the given name has been declared.
pub fn exists(owner: Option<&str>, member: &str) -> bool {
    catalogue().contains_key(&Key::new(owner, member))
}
