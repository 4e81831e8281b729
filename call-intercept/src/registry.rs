//! The process-wide table of live interceptions.

use crate::config::Loggers;
use crate::error::{Error, Result};
use crate::target::{Key, Target};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

static REGISTRY: Lazy<Mutex<HashMap<Key, Arc<Record>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

// Number of entries in `REGISTRY`, readable without taking the lock.
static LIVE: AtomicUsize = AtomicUsize::new(0);

static POISON_REPORTED: AtomicBool = AtomicBool::new(false);

/// One installed interception.
pub(crate) struct Record {
    pub(crate) target: &'static Target,
    pub(crate) preserved_name: String,
    pub(crate) loggers: Loggers,
    active: AtomicBool,
}

impl Record {
    pub(crate) fn new(target: &'static Target, loggers: Loggers) -> Self {
        Record {
            target,
            preserved_name: target.preserved_name(),
            loggers,
            active: AtomicBool::new(true),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Deactivates the record and removes it from the registry. Does nothing
    /// if it is already inactive.
    pub(crate) fn retire(self: &Arc<Self>) -> Result<()> {
        if !self.active.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let mut registry = lock(self.target)?;
        let owned = registry
            .get(self.target.key())
            .map(|entry| Arc::ptr_eq(entry, self));
        match owned {
            Some(true) => {
                registry.remove(self.target.key());
                LIVE.fetch_sub(1, Ordering::AcqRel);
                tracing::debug!(name = %self.target, "interception removed");
                Ok(())
            }
            Some(false) => Err(patch_error(
                self.target,
                "registry entry belongs to another interception",
            )),
            None => Err(patch_error(self.target, "registry entry is missing")),
        }
    }
}

fn patch_error(target: &Target, reason: &str) -> Error {
    Error::Patch {
        target: target.to_string(),
        reason: reason.to_owned(),
    }
}

fn lock(target: &Target) -> Result<MutexGuard<'static, HashMap<Key, Arc<Record>>>> {
    REGISTRY
        .lock()
        .map_err(|_| patch_error(target, "interception registry is poisoned"))
}

/// Registers a record under its target's key.
pub(crate) fn insert(record: Arc<Record>) -> Result<()> {
    let target = record.target;
    let mut registry = lock(target)?;
    if registry.contains_key(target.key()) {
        return Err(Error::Duplicate(target.to_string()));
    }
    registry.insert(target.key().clone(), record);
    LIVE.fetch_add(1, Ordering::AcqRel);
    Ok(())
}

/// Returns the live record for `target`, if any.
///
/// Only the target the record was installed for matches. Same-named free
/// functions in other modules share its key but are not intercepted.
pub(crate) fn find(target: &Target) -> Option<Arc<Record>> {
    if LIVE.load(Ordering::Acquire) == 0 {
        return None;
    }
    let registry = match REGISTRY.lock() {
        Ok(registry) => registry,
        Err(_) => {
            if !POISON_REPORTED.swap(true, Ordering::AcqRel) {
                tracing::warn!(
                    name = %target,
                    "interception registry is poisoned, calls are no longer intercepted"
                );
            }
            return None;
        }
    };
    registry
        .get(target.key())
        .filter(|record| std::ptr::eq(record.target, target) && record.is_active())
        .cloned()
}

/// Copies out all registered records.
pub(crate) fn snapshot() -> Vec<Arc<Record>> {
    match REGISTRY.lock() {
        Ok(registry) => registry.values().cloned().collect(),
        Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
    }
}
