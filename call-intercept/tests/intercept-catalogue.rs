use call_intercept::{exists, interceptable, lookup, preserved_name, Config, Error, Interception, Key};

struct Widget;

#[interceptable]
impl Widget {
    fn spin(&self) -> u32 {
        1
    }
}

#[interceptable]
pub fn tick() -> u32 {
    0
}

fn not_found(owner: Option<&str>, member: &str) -> String {
    match Interception::install(owner, member, Config::quiet()) {
        Err(Error::TargetNotFound(message)) => message,
        other => panic!("expected a missing target, got {:?}", other),
    }
}

#[test]
fn missing_targets() {
    assert_eq!(
        not_found(None, "missing"),
        "no interceptable function `missing`"
    );
    assert_eq!(not_found(Some("Gadget"), "spin"), "no interceptable type `gadget`");
    assert_eq!(
        not_found(Some("Widget"), "wobble"),
        "type `widget` has no interceptable method `wobble`"
    );
    assert!(matches!(lookup(None, "spin"), Err(Error::TargetNotFound(_))));
}

#[test]
fn normalized_names() {
    assert_eq!(Key::new(Some("::Widget"), "SPIN"), Key::new(Some("widget"), "spin"));
    assert_eq!(Key::new(None, "::Tick").to_string(), "tick");
    assert_eq!(Key::new(Some("Widget"), "spin").to_string(), "widget::spin");
    assert!(exists(Some("::WIDGET"), "Spin"));
    assert!(exists(None, "tick"));

    let target = lookup(Some("widget"), "spin").unwrap();
    assert_eq!(target.owner(), Some("Widget"));
    assert_eq!(target.member(), "spin");
    assert_eq!(target.to_string(), format!("{}::Widget::spin", module_path!()));
    assert!(target.file().ends_with("intercept-catalogue.rs"));
    assert_eq!(Widget.spin(), 1);
}

#[test]
fn preserved_names() {
    assert_eq!(preserved_name("tick"), "tick__intercept_original");

    let interception = Interception::function("tick", Config::quiet()).unwrap();
    assert_eq!(interception.preserved_name(), "tick__intercept_original");
    assert!(interception.target().is_public());
    assert_eq!(tick(), 0);
}
