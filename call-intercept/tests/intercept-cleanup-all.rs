use call_intercept::{active_interceptions, cleanup_all, interceptable, Config, Interception};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[interceptable]
fn one() -> u32 {
    1
}

#[interceptable]
fn two() -> u32 {
    2
}

fn counting(calls: &Arc<AtomicUsize>) -> Config {
    let calls = calls.clone();
    Config::quiet().on_return(move |_, _| {
        calls.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test() {
    cleanup_all().unwrap();
    assert!(active_interceptions().is_empty());

    let calls = Arc::new(AtomicUsize::new(0));
    let first = Interception::function("one", counting(&calls)).unwrap();
    let second = Interception::function("two", counting(&calls)).unwrap();
    assert_eq!(
        active_interceptions(),
        vec![
            format!("{}::one", module_path!()),
            format!("{}::two", module_path!()),
        ]
    );
    assert_eq!(one() + two(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    cleanup_all().unwrap();
    assert!(!first.is_active());
    assert!(!second.is_active());
    assert!(active_interceptions().is_empty());
    assert_eq!(one() + two(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    first.cleanup().unwrap();
    drop(second);
    cleanup_all().unwrap();

    let again = Interception::function("one", counting(&calls)).unwrap();
    assert_eq!(one(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    drop(again);
    assert!(active_interceptions().is_empty());
}
