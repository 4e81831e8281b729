use call_intercept::{interceptable, Config, Interception};
use std::sync::{Arc, Mutex};

#[interceptable]
fn depth(n: u32) -> u32 {
    if n == 0 {
        0
    } else {
        depth(n - 1) + 1
    }
}

#[interceptable]
fn square(x: u32) -> u32 {
    x * x
}

#[test]
fn nested_calls() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let _interception = Interception::function(
        "depth",
        Config::quiet().on_args(move |_, args| log.lock().unwrap().push(format!("{:?}", args))),
    )
    .unwrap();

    assert_eq!(depth(2), 2);
    assert_eq!(*seen.lock().unwrap(), vec!["[2]", "[1]", "[0]"]);
}

#[test]
fn loggers_calling_targets() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let _interception = Interception::function(
        "square",
        Config::quiet().on_return(move |_, value| {
            let doubled = square(2);
            log.lock().unwrap().push(format!("{:?} {}", value, doubled));
        }),
    )
    .unwrap();

    assert_eq!(square(3), 9);
    assert_eq!(*seen.lock().unwrap(), vec!["9 4"]);
}
