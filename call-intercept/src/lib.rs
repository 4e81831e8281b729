#![warn(missing_docs)]

/*!
Intercept calls to functions and methods at runtime, logging their
arguments, the call-site backtrace, the return value and any error or panic,
then restore the original behavior on demand.

Functions opt in with `#[interceptable]`. Until an [`Interception`] is
installed for them they behave as if the attribute was not there; while one
is installed, every call is routed through the configured loggers.

# Example (simple)
```
use call_intercept::{interceptable, Config, Interception};

#[interceptable]
fn add(x: i32, y: i32) -> i32 {
    x + y
}

fn main() {
    let interception = Interception::function("add", Config::new().backtrace(false)).unwrap();
    add(1, 2);
    interception.cleanup().unwrap();
    add(3, 4);
}
```

Output:

```text
in rust_out::add : Params :
[
    1,
    2,
]
return value of rust_out::add is :
3
```

# Example (methods)

```
use call_intercept::{interceptable, loggers, Config, Interception};

struct Parser;

#[interceptable]
impl Parser {
    fn parse(&self, text: &str) -> Result<u32, std::num::ParseIntError> {
        text.parse()
    }
}

fn main() {
    let _interception = Interception::method(
        "Parser",
        "parse",
        Config::quiet().on_args(loggers::json_args).on_exception(loggers::dump_failure),
    )
    .unwrap();

    assert_eq!(Parser.parse("12"), Ok(12));
    assert!(Parser.parse("twelve").is_err());
}
```

Output:

```text
Calling rust_out::Parser::parse: args=["12"]
Calling rust_out::Parser::parse: args=["twelve"]
exception in rust_out::Parser::parse : core::num::error::ParseIntError : ParseIntError { kind: InvalidDigit }
   0: backtrace::backtrace::trace_unsynchronized
   ...
```

# Example (custom callback)

```
use call_intercept::{interceptable, output, Config, Interception};

#[interceptable]
fn greet(name: &str) -> String {
    format!("hello {}", name)
}

fn main() {
    let config = Config::quiet()
        .on_args(|target, args| output::emit(&format!("> {} {:?}\n", target.member(), args)))
        .on_return(|target, value| output::emit(&format!("< {} {:?}\n", target.member(), value)));
    let _interception = Interception::function("greet", config).unwrap();

    let (greeting, log) = output::capture(|| greet("world"));
    assert_eq!(greeting, "hello world");
    assert_eq!(log, "> greet [\"world\"]\n< greet \"hello world\"\n");
}
```
*/

pub use call_intercept_macro::interceptable;

mod catalogue;
mod config;
mod dispatch;
mod error;
mod interception;
pub mod loggers;
pub mod output;
mod registry;
mod target;

pub use crate::catalogue::{exists, lookup};
pub use crate::config::{Config, LoggerOption, Options, Selector};
pub use crate::error::{Error, Result};
pub use crate::interception::{active_interceptions, cleanup_all, Interception};
pub use crate::target::{preserved_name, Key, Target, ORIGINAL_SUFFIX};

/// Used by code generated by `#[interceptable]`. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use crate::catalogue::declare;
    pub use crate::dispatch::{
        enter, type_name_of, DebugArg, Frame, OpaqueArg, Probe, SerializeArg, Token,
    };
    pub use ::ctor;
}
