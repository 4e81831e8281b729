use call_intercept::{interceptable, Config, Error, Interception};

#[interceptable]
fn answer() -> u32 {
    42
}

#[interceptable]
fn dropped() -> u32 {
    0
}

#[test]
fn duplicate() {
    let first = Interception::function("answer", Config::quiet()).unwrap();

    let err = Interception::function("answer", Config::quiet()).unwrap_err();
    assert!(matches!(err, Error::Duplicate(ref name) if name.ends_with("::answer")));

    let err = Interception::function("::ANSWER", Config::quiet()).unwrap_err();
    assert!(matches!(err, Error::Duplicate(_)));

    first.cleanup().unwrap();
    first.cleanup().unwrap();

    let second = Interception::function("answer", Config::quiet()).unwrap();
    assert!(second.is_active());
    assert_eq!(answer(), 42);
}

#[test]
fn drop_restores() {
    {
        let _interception = Interception::function("dropped", Config::quiet()).unwrap();
    }
    let again = Interception::function("dropped", Config::quiet()).unwrap();
    assert!(again.is_active());
}
