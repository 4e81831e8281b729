use crate::catalogue;
use crate::config::Config;
use crate::error::Result;
use crate::registry::{self, Record};
use crate::target::Target;
use std::fmt;
use std::sync::Arc;

/// A live interception of one target.
///
/// Calls to the target are logged until [`cleanup`](Interception::cleanup)
/// is called or the handle is dropped.
#[must_use = "dropping an `Interception` restores the target immediately"]
pub struct Interception {
    record: Arc<Record>,
}

impl Interception {
    /// Starts intercepting `owner::member`, or the free function `member`
    /// when `owner` is `None`.
    ///
    /// # Errors
    ///
    /// - [`Error::TargetNotFound`](crate::Error::TargetNotFound) if no such
    ///   target was compiled with `#[interceptable]`
    /// - [`Error::Duplicate`](crate::Error::Duplicate) if the target is
    ///   already intercepted
    /// - [`Error::Patch`](crate::Error::Patch) if the registry is unusable
    pub fn install(owner: Option<&str>, member: &str, config: Config) -> Result<Self> {
        let target = catalogue::lookup(owner, member)?;
        let record = Arc::new(Record::new(target, config.resolve()));
        registry::insert(record.clone())?;
        tracing::debug!(
            name = %target,
            preserved = %record.preserved_name,
            "interception installed"
        );
        Ok(Interception { record })
    }

    /// Starts intercepting the free function `member`.
    pub fn function(member: &str, config: Config) -> Result<Self> {
        Self::install(None, member, config)
    }

    /// Starts intercepting the method `owner::member`.
    pub fn method(owner: &str, member: &str, config: Config) -> Result<Self> {
        Self::install(Some(owner), member, config)
    }

    /// Restores the target. Calling this more than once does nothing.
    ///
    /// # Errors
    ///
    /// [`Error::Patch`](crate::Error::Patch) if the registry entry could not
    /// be removed. The interception is left inactive in that case.
    pub fn cleanup(&self) -> Result<()> {
        self.record.retire()
    }

    /// `false` once the interception has been cleaned up.
    pub fn is_active(&self) -> bool {
        self.record.is_active()
    }

    /// The intercepted target.
    pub fn target(&self) -> &'static Target {
        self.record.target
    }

    /// Name the original body is preserved under.
    pub fn preserved_name(&self) -> &str {
        &self.record.preserved_name
    }
}

impl fmt::Debug for Interception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interception")
            .field("target", &format_args!("{}", self.record.target))
            .field("preserved_name", &self.record.preserved_name)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Interception {
    fn drop(&mut self) {
        if let Err(err) = self.record.retire() {
            tracing::warn!(name = %self.record.target, error = %err, "failed to restore on drop");
        }
    }
}

/// Cleans up every live interception.
///
/// Stops at the first failure; interceptions not reached yet stay installed.
pub fn cleanup_all() -> Result<()> {
    for record in registry::snapshot() {
        record.retire()?;
    }
    Ok(())
}

/// Fully-qualified names of all live interceptions, sorted.
pub fn active_interceptions() -> Vec<String> {
    let mut names: Vec<String> = registry::snapshot()
        .iter()
        .filter(|record| record.is_active())
        .map(|record| record.target.to_string())
        .collect();
    names.sort();
    names
}
