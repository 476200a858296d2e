use ferrous_activator::{DiError, Resolver, ServiceCollection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Logger;
struct Store;

struct Service {
    arity: usize,
}

fn service_collection() -> ServiceCollection {
    let mut sc = ServiceCollection::new();
    sc.describe::<Logger>().constructor(|()| Logger);
    sc.describe::<Store>().constructor(|()| Store);
    sc.describe::<Service>()
        .constructor(|()| Service { arity: 0 })
        .constructor(|(_l,): (Arc<Logger>,)| Service { arity: 1 })
        .constructor(|(_l, _s): (Arc<Logger>, Arc<Store>)| Service { arity: 2 });
    sc.add_transient::<Service>();
    sc
}

#[test]
fn greediest_satisfiable_constructor_is_chosen() {
    let mut sc = service_collection();
    sc.add_singleton::<Logger>();
    sc.add_singleton::<Store>();
    let sp = sc.build().unwrap();

    assert_eq!(sp.get_required::<Service>().unwrap().arity, 2);
}

#[test]
fn next_greediest_when_a_dependency_is_missing() {
    let mut sc = service_collection();
    sc.add_singleton::<Logger>();
    let sp = sc.build().unwrap();
    let scope = sp.create_scope();

    // Scopes do not self-bind, so Store is unavailable there.
    assert_eq!(scope.get_required::<Service>().unwrap().arity, 1);
    // The root self-binds Store.
    assert_eq!(sp.get_required::<Service>().unwrap().arity, 2);
}

#[test]
fn unsatisfiable_constructors_are_reported() {
    struct Needy {
        _logger: Arc<Logger>,
    }
    struct Secret;

    let mut sc = ServiceCollection::new();
    sc.describe::<Needy>()
        .constructor(|(logger,): (Arc<Logger>,)| Needy { _logger: logger })
        .constructor(|(logger, _s): (Arc<Logger>, Arc<Secret>)| Needy { _logger: logger });
    sc.add_scoped::<Needy>();
    let sp = sc.build().unwrap();
    let scope = sp.create_scope();

    match scope.get_required::<Needy>() {
        Err(DiError::Unsatisfiable { type_name, constructors }) => {
            assert!(type_name.ends_with("Needy"));
            assert_eq!(constructors.len(), 2);
            assert_eq!(constructors[0].signature, "Needy(Logger, Secret)");
            assert_eq!(constructors[0].missing.len(), 2);
            assert_eq!(constructors[1].signature, "Needy(Logger)");
            assert!(constructors[1].missing[0].ends_with("Logger"));
        }
        other => panic!("expected Unsatisfiable, got {:?}", other.map(|_| ())),
    }
}

#[derive(Debug)]
struct Refused;

impl std::fmt::Display for Refused {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("refused to start")
    }
}

impl std::error::Error for Refused {}

#[test]
fn failing_constructor_is_wrapped_and_not_cached() {
    struct Flaky;

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let mut sc = ServiceCollection::new();
    sc.describe::<Flaky>().try_constructor(move |()| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(Refused)
        } else {
            Ok(Flaky)
        }
    });
    sc.add_singleton::<Flaky>();
    let sp = sc.build().unwrap();

    match sp.get_required::<Flaky>() {
        Err(err @ DiError::Construction { .. }) => {
            assert!(err.to_string().contains("refused to start"));
            let source = std::error::Error::source(&err).unwrap();
            assert_eq!(source.to_string(), "refused to start");
        }
        other => panic!("expected Construction, got {:?}", other.map(|_| ())),
    }

    let first = sp.get_required::<Flaky>().unwrap();
    let second = sp.get_required::<Flaky>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn panicking_constructor_becomes_construction_error() {
    struct Explosive;

    let mut sc = ServiceCollection::new();
    sc.describe::<Explosive>()
        .constructor(|()| -> Explosive { panic!("kaboom") });
    sc.add_transient::<Explosive>();
    let sp = sc.build().unwrap();

    match sp.get_required::<Explosive>() {
        Err(DiError::Construction { type_name, source }) => {
            assert!(type_name.ends_with("Explosive"));
            assert!(source.to_string().contains("kaboom"));
        }
        other => panic!("expected Construction, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn panicking_factory_becomes_construction_error() {
    struct Fragile;

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<Fragile, _>(|_| -> ferrous_activator::DiResult<Fragile> {
        panic!("factory failed")
    });
    let sp = sc.build().unwrap();
    let scope = sp.create_scope();

    assert!(matches!(
        scope.get_required::<Fragile>(),
        Err(DiError::Construction { .. })
    ));
}

#[test]
fn abstract_types_are_never_instantiated() {
    struct Marker;

    let mut sc = ServiceCollection::new();
    sc.describe::<Marker>().constructor(|()| Marker);
    sc.describe_abstract::<Marker>();
    let sp = sc.build().unwrap();

    assert!(!sp.can_resolve::<Marker>());
    assert!(sp.get_service::<Marker>().unwrap().is_none());
    assert!(matches!(
        sp.create_instance::<Marker>(vec![]),
        Err(DiError::AbstractType(_))
    ));
}

#[test]
fn nested_dependency_errors_propagate() {
    struct Top {
        _store: Arc<Store>,
    }

    let mut sc = ServiceCollection::new();
    sc.describe::<Store>()
        .try_constructor(|()| Err::<Store, _>(Refused));
    sc.describe::<Top>()
        .constructor(|(store,): (Arc<Store>,)| Top { _store: store });
    let sp = sc.build().unwrap();

    match sp.get_required::<Top>() {
        Err(DiError::Construction { type_name, .. }) => assert!(type_name.ends_with("Store")),
        other => panic!("expected Construction, got {:?}", other.map(|_| ())),
    }
}
