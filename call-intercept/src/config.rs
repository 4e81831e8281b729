use crate::error::{Error, Result};
use crate::loggers::{self, ArgsFn, FailureFn, ReturnFn};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Chooses one logging callback.
pub enum Selector<F: ?Sized> {
    /// The built-in callback for this kind of event.
    Default,
    /// Log nothing.
    Noop,
    /// A user-provided callback.
    Custom(Arc<F>),
}

impl<F: ?Sized> Clone for Selector<F> {
    fn clone(&self) -> Self {
        match self {
            Selector::Default => Selector::Default,
            Selector::Noop => Selector::Noop,
            Selector::Custom(f) => Selector::Custom(f.clone()),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Selector<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Default => f.write_str("Default"),
            Selector::Noop => f.write_str("Noop"),
            Selector::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<F: ?Sized> Selector<F> {
    fn resolve(&self, default: Arc<F>) -> Option<Arc<F>> {
        match self {
            Selector::Default => Some(default),
            Selector::Noop => None,
            Selector::Custom(f) => Some(f.clone()),
        }
    }
}

/// Logging configuration of an interception.
///
/// ```
/// use call_intercept::{loggers, Config, Selector};
///
/// let config = Config::new()
///     .backtrace(false)
///     .on_args(loggers::json_args)
///     .return_logger(Selector::Noop);
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    backtrace: bool,
    args: Selector<ArgsFn>,
    returns: Selector<ReturnFn>,
    failures: Selector<FailureFn>,
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Prints backtraces and uses the built-in loggers.
    pub fn new() -> Self {
        Config {
            backtrace: true,
            args: Selector::Default,
            returns: Selector::Default,
            failures: Selector::Default,
        }
    }

    /// Logs nothing at all. Useful as a starting point for enabling
    /// individual loggers.
    pub fn quiet() -> Self {
        Config {
            backtrace: false,
            args: Selector::Noop,
            returns: Selector::Noop,
            failures: Selector::Noop,
        }
    }

    /// Whether to print the call stack on entry.
    pub fn backtrace(mut self, on: bool) -> Self {
        self.backtrace = on;
        self
    }

    /// Selects the arguments logger.
    pub fn args_logger(mut self, selector: Selector<ArgsFn>) -> Self {
        self.args = selector;
        self
    }

    /// Selects the return logger.
    pub fn return_logger(mut self, selector: Selector<ReturnFn>) -> Self {
        self.returns = selector;
        self
    }

    /// Selects the exception logger.
    pub fn exception_logger(mut self, selector: Selector<FailureFn>) -> Self {
        self.failures = selector;
        self
    }

    /// Uses `f` as the arguments logger.
    pub fn on_args<F>(self, f: F) -> Self
    where
        F: Fn(&crate::Target, &loggers::Arguments<'_>) + Send + Sync + 'static,
    {
        self.args_logger(Selector::Custom(Arc::new(f)))
    }

    /// Uses `f` as the return logger.
    pub fn on_return<F>(self, f: F) -> Self
    where
        F: Fn(&crate::Target, &dyn fmt::Debug) + Send + Sync + 'static,
    {
        self.return_logger(Selector::Custom(Arc::new(f)))
    }

    /// Uses `f` as the exception logger.
    pub fn on_exception<F>(self, f: F) -> Self
    where
        F: Fn(&crate::Target, &loggers::Failure<'_>) + Send + Sync + 'static,
    {
        self.exception_logger(Selector::Custom(Arc::new(f)))
    }

    /// Builds a config from a JSON mapping of option names to values.
    ///
    /// Recognized keys are `backtrace` (a boolean), and `args_logger`,
    /// `return_logger` and `exception_logger`, each either `false` or the
    /// name of a built-in logger: `"default"`, `"noop"`, or, for
    /// `args_logger` only, `"json"`. Absent keys keep their defaults.
    ///
    /// ```
    /// use call_intercept::Config;
    ///
    /// let config = Config::from_json(r#"{"backtrace": false, "args_logger": "json"}"#).unwrap();
    /// assert!(Config::from_json(r#"{"args_logger": "print_r"}"#).is_err());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Options = serde_json::from_str(json)?;
        options.into_config()
    }

    pub(crate) fn resolve(&self) -> Loggers {
        Loggers {
            backtrace: self.backtrace,
            args: self.args.resolve(Arc::new(loggers::dump_args)),
            returns: self.returns.resolve(Arc::new(loggers::dump_return)),
            failures: self.failures.resolve(Arc::new(loggers::dump_failure)),
        }
    }
}

/// The callbacks of an installed interception. `None` means no-op.
pub(crate) struct Loggers {
    pub(crate) backtrace: bool,
    pub(crate) args: Option<Arc<ArgsFn>>,
    pub(crate) returns: Option<Arc<ReturnFn>>,
    pub(crate) failures: Option<Arc<FailureFn>>,
}

/// The name-based form of [`Config`], as accepted by [`Config::from_json`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Print the call stack on entry. Defaults to `true`.
    pub backtrace: Option<bool>,
    /// Arguments logger.
    pub args_logger: Option<LoggerOption>,
    /// Return logger.
    pub return_logger: Option<LoggerOption>,
    /// Exception logger.
    pub exception_logger: Option<LoggerOption>,
}

/// A logger option value: `false` or a built-in logger name.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum LoggerOption {
    /// `false` disables the logger. `true` is rejected.
    Flag(bool),
    /// Name of a built-in logger.
    Name(String),
}

impl Options {
    /// Resolves the option values to a [`Config`].
    pub fn into_config(self) -> Result<Config> {
        let mut config = Config::new();
        if let Some(backtrace) = self.backtrace {
            config = config.backtrace(backtrace);
        }
        if let Some(option) = self.args_logger {
            let json: Arc<ArgsFn> = Arc::new(loggers::json_args);
            config = config.args_logger(select("args_logger", option, &[("json", json)])?);
        }
        if let Some(option) = self.return_logger {
            config = config.return_logger(select("return_logger", option, &[])?);
        }
        if let Some(option) = self.exception_logger {
            config = config.exception_logger(select("exception_logger", option, &[])?);
        }
        Ok(config)
    }
}

fn select<F: ?Sized>(
    option_name: &str,
    option: LoggerOption,
    named: &[(&str, Arc<F>)],
) -> Result<Selector<F>> {
    match option {
        LoggerOption::Flag(false) => Ok(Selector::Noop),
        LoggerOption::Flag(true) => Err(Error::Configuration(format!(
            "`{}` must be `false` or a logger name, not `true`",
            option_name
        ))),
        LoggerOption::Name(name) => match name.as_str() {
            "default" => Ok(Selector::Default),
            "noop" => Ok(Selector::Noop),
            other => named
                .iter()
                .find(|(candidate, _)| *candidate == other)
                .map(|(_, f)| Selector::Custom(f.clone()))
                .ok_or_else(|| {
                    Error::Configuration(format!(
                        "`{}` is not a known logger for `{}`",
                        other, option_name
                    ))
                }),
        },
    }
}
