use call_intercept::{interceptable, loggers, output, Config, Interception, Selector};

#[derive(Debug)]
struct Counter {
    count: u32,
}

#[interceptable]
impl Counter {
    pub fn new() -> Self {
        Counter { count: 0 }
    }

    fn bump(&mut self, by: u32) -> u32 {
        self.count += by;
        self.count
    }

    fn count_mut(&mut self) -> &mut u32 {
        &mut self.count
    }

    fn with_pair(&self, (a, b): (u32, u32)) -> u32 {
        self.count + a + b
    }
}

trait Shape {
    fn area(&self) -> u32;
    fn sides() -> u32;
}

struct Square(u32);

#[interceptable]
impl Shape for Square {
    fn area(&self) -> u32 {
        self.0 * self.0
    }

    fn sides() -> u32 {
        4
    }
}

struct Holder<T>(T);

#[interceptable(owner = "Wrapped")]
impl<T: Clone> Holder<T> {
    fn get(&self) -> T {
        self.0.clone()
    }
}

#[test]
fn instance_methods() {
    let interception = Interception::method(
        "Counter",
        "bump",
        Config::quiet().on_args(loggers::json_args),
    )
    .unwrap();
    assert!(!interception.target().is_static());
    assert!(!interception.target().is_public());

    let mut counter = Counter { count: 1 };
    let (value, log) = output::capture(|| counter.bump(5));
    assert_eq!(value, 6);
    assert_eq!(
        log,
        format!("Calling {}::Counter::bump: args=[5]\n", module_path!())
    );
}

#[test]
fn static_methods() {
    let interception =
        Interception::method("counter", "NEW", Config::quiet().return_logger(Selector::Default))
            .unwrap();
    assert!(interception.target().is_static());
    assert!(interception.target().is_public());

    let (counter, log) = output::capture(Counter::new);
    assert_eq!(counter.count, 0);
    assert!(log.contains("Counter {\n    count: 0,\n}"));
}

#[test]
fn borrowed_returns() {
    let _interception = Interception::method(
        "Counter",
        "count_mut",
        Config::quiet().return_logger(Selector::Default),
    )
    .unwrap();

    let mut counter = Counter { count: 2 };
    let (_, log) = output::capture(|| *counter.count_mut() += 1);
    assert_eq!(counter.count, 3);
    assert!(log.ends_with("is :\n2\n"));
}

#[test]
fn pattern_arguments() {
    let _interception = Interception::method(
        "Counter",
        "with_pair",
        Config::quiet().on_args(loggers::json_args),
    )
    .unwrap();

    let counter = Counter { count: 1 };
    let (value, log) = output::capture(|| counter.with_pair((2, 3)));
    assert_eq!(value, 6);
    assert!(log.ends_with("args=[[2,3]]\n"));
}

#[test]
fn trait_methods() {
    let interception = Interception::method(
        "Square",
        "area",
        Config::quiet().return_logger(Selector::Default),
    )
    .unwrap();
    assert!(interception.target().is_public());

    let (area, log) = output::capture(|| Square(3).area());
    assert_eq!(area, 9);
    assert_eq!(
        log,
        format!("return value of {}::Square::area is :\n9\n", module_path!())
    );

    let (sides, log) = output::capture(Square::sides);
    assert_eq!(sides, 4);
    assert_eq!(log, "");
}

#[test]
fn owner_override() {
    let _interception = Interception::method(
        "Wrapped",
        "get",
        Config::quiet().return_logger(Selector::Default),
    )
    .unwrap();

    let (value, log) = output::capture(|| Holder(String::from("x")).get());
    assert_eq!(value, "x");
    assert!(log.contains("<opaque alloc::string::String>"));
}
