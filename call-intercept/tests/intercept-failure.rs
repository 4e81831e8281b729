use call_intercept::{interceptable, output, Config, Interception, Selector};
use std::panic;
use std::sync::{Arc, Mutex};

#[derive(Debug, PartialEq)]
struct Broken {
    code: u32,
}

#[interceptable]
fn check(code: u32) -> Result<u32, Broken> {
    if code == 0 {
        Ok(0)
    } else {
        Err(Broken { code })
    }
}

#[interceptable]
fn validate(code: u32) -> Result<(), Broken> {
    match code {
        0 => Ok(()),
        _ => Err(Broken { code }),
    }
}

#[interceptable]
fn explode(message: &str) -> u32 {
    panic!("{}", message)
}

fn recorder() -> (Arc<Mutex<Vec<String>>>, Config) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let failures = events.clone();
    let returns = events.clone();
    let config = Config::quiet()
        .on_exception(move |_, failure| {
            failures
                .lock()
                .unwrap()
                .push(format!("{} / {}", failure.kind(), failure.message()));
        })
        .on_return(move |_, value| {
            returns.lock().unwrap().push(format!("returned {:?}", value));
        });
    (events, config)
}

#[test]
fn errors_are_observed_and_returned() {
    let (events, config) = recorder();
    let _interception = Interception::function("check", config).unwrap();

    assert_eq!(check(7), Err(Broken { code: 7 }));
    assert_eq!(check(0), Ok(0));

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        format!("{}::Broken / Broken {{ code: 7 }}", module_path!())
    );
    assert_eq!(events[1], "returned 0");
}

#[test]
fn default_exception_logger() {
    let _interception = Interception::function(
        "validate",
        Config::quiet().exception_logger(Selector::Default),
    )
    .unwrap();

    let (result, log) = output::capture(|| validate(3));
    assert_eq!(result, Err(Broken { code: 3 }));
    assert!(log.starts_with(&format!(
        "exception in {0}::validate : {0}::Broken : Broken {{ code: 3 }}\n",
        module_path!()
    )));
    assert_eq!(log.matches("exception in").count(), 1);
}

#[test]
fn panics_are_observed_and_resumed() {
    let (events, config) = recorder();
    let _interception = Interception::function("explode", config).unwrap();

    let payload = panic::catch_unwind(|| explode("boom")).unwrap_err();
    assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("boom"));

    let events = events.lock().unwrap();
    assert_eq!(*events, vec!["panic / boom".to_owned()]);
}
