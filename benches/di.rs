use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_activator::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut sc = ServiceCollection::new();
    sc.add_instance(42u64);
    let sp = sc.build().unwrap();

    let _ = sp.get_required::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = sp.get_required::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let mut sc = ServiceCollection::new();
                sc.describe::<ExpensiveToCreate>().constructor(|()| ExpensiveToCreate {
                    data: (0..1000).collect(),
                });
                sc.add_singleton::<ExpensiveToCreate>();
                sc.build().unwrap()
            },
            |sp| {
                let v = sp.get_required::<ExpensiveToCreate>().unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_constructor_vs_factory(c: &mut Criterion) {
    let mut group = c.benchmark_group("transient_construction");

    struct Config(u32);
    struct ViaConstructor {
        config: Arc<Config>,
    }
    struct ViaFactory {
        config: Arc<Config>,
    }

    let mut sc = ServiceCollection::new();
    sc.add_instance(Config(7));
    sc.describe::<ViaConstructor>()
        .constructor(|(config,): (Arc<Config>,)| ViaConstructor { config });
    sc.add_transient::<ViaConstructor>();
    sc.add_transient_factory::<ViaFactory, _>(|r| {
        Ok(ViaFactory {
            config: r.get_required::<Config>()?,
        })
    });
    let sp = sc.build().unwrap();

    group.bench_function("constructor", |b| {
        b.iter(|| {
            let v = sp.get_required::<ViaConstructor>().unwrap();
            black_box(v.config.0);
        })
    });
    group.bench_function("factory", |b| {
        b.iter(|| {
            let v = sp.get_required::<ViaFactory>().unwrap();
            black_box(v.config.0);
        })
    });

    group.finish();
}

fn bench_concrete_vs_trait(c: &mut Criterion) {
    let mut group = c.benchmark_group("concrete_vs_trait");

    trait Counter: Send + Sync {
        fn value(&self) -> u64;
    }

    struct Fixed(u64);
    impl Counter for Fixed {
        fn value(&self) -> u64 {
            self.0
        }
    }

    let mut sc = ServiceCollection::new();
    sc.describe_abstract::<dyn Counter>();
    sc.describe::<Fixed>()
        .constructor(|()| Fixed(42))
        .implements::<dyn Counter, _>(|f| f as Arc<dyn Counter>);
    sc.add_singleton::<Fixed>();
    let sp = sc.build().unwrap();

    let _ = sp.get_required::<Fixed>().unwrap();

    group.bench_function("concrete", |b| {
        b.iter(|| {
            let v = sp.get_required::<Fixed>().unwrap();
            black_box(v.0);
        })
    });

    // matched through the produced type and upcast on every request
    group.bench_function("assignable_trait", |b| {
        b.iter(|| {
            let v = sp.get_required::<dyn Counter>().unwrap();
            black_box(v.value());
        })
    });

    group.finish();
}

fn bench_scope_lifecycle(c: &mut Criterion) {
    struct RequestState(u64);

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<RequestState, _>(|_| Ok(RequestState(1)));
    let sp = sc.build().unwrap();

    c.bench_function("scope_create_resolve_close", |b| {
        b.iter(|| {
            let scope = sp.create_scope();
            let v = scope.get_required::<RequestState>().unwrap();
            black_box(v.0);
            scope.close();
        })
    });
}

fn bench_explicit_args(c: &mut Criterion) {
    struct Config(u32);
    struct Handler {
        config: Arc<Config>,
        id: Arc<u64>,
    }

    let mut sc = ServiceCollection::new();
    sc.add_instance(Config(3));
    sc.describe::<Handler>()
        .constructor(|(config, id): (Arc<Config>, Arc<u64>)| Handler { config, id });
    let sp = sc.build().unwrap();

    c.bench_function("create_instance_with_args", |b| {
        b.iter(|| {
            let h = sp.create_instance::<Handler>(vec![Arg::new(9u64)]).unwrap();
            black_box(h.config.0 as u64 + *h.id);
        })
    });
}

fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("circular_detection");

    struct Service1;
    struct Service2 { _s1: Arc<Service1> }
    struct Service3 { _s2: Arc<Service2> }
    struct Service4 { _s3: Arc<Service3> }
    struct Service5 { _s4: Arc<Service4> }
    struct Service6 { _s5: Arc<Service5> }
    struct Service7 { _s6: Arc<Service6> }
    struct Service8 { _s7: Arc<Service7> }

    let mut sc = ServiceCollection::new();
    sc.describe::<Service1>().constructor(|()| Service1);
    sc.describe::<Service2>().constructor(|(s,): (Arc<Service1>,)| Service2 { _s1: s });
    sc.describe::<Service3>().constructor(|(s,): (Arc<Service2>,)| Service3 { _s2: s });
    sc.describe::<Service4>().constructor(|(s,): (Arc<Service3>,)| Service4 { _s3: s });
    sc.describe::<Service5>().constructor(|(s,): (Arc<Service4>,)| Service5 { _s4: s });
    sc.describe::<Service6>().constructor(|(s,): (Arc<Service5>,)| Service6 { _s5: s });
    sc.describe::<Service7>().constructor(|(s,): (Arc<Service6>,)| Service7 { _s6: s });
    sc.describe::<Service8>().constructor(|(s,): (Arc<Service7>,)| Service8 { _s7: s });
    sc.add_transient::<Service1>();
    sc.add_transient::<Service2>();
    sc.add_transient::<Service3>();
    sc.add_transient::<Service4>();
    sc.add_transient::<Service5>();
    sc.add_transient::<Service6>();
    sc.add_transient::<Service7>();
    sc.add_transient::<Service8>();
    let sp = sc.build().unwrap();

    group.bench_function("transient_chain_depth_8", |b| {
        b.iter(|| {
            let service = sp.get_required::<Service8>().unwrap();
            black_box(&service);
        })
    });

    group.finish();
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");

    let mut sc = ServiceCollection::new();
    sc.add_instance(42u64);
    let sp = sc.build().unwrap();

    let _ = sp.get_required::<u64>().unwrap();

    for &thread_count in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("singleton_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let sp_ref = &sp;
                            s.spawn(move |_| {
                                for _ in 0..iters / threads as u64 {
                                    let v = sp_ref.get_required::<u64>().unwrap();
                                    black_box(v);
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );
    }

    group.finish();
}

// ===== Macro Benchmarks =====

fn bench_mixed_workload(c: &mut Criterion) {
    // 70% singleton hits, 20% scoped hits, 10% transient
    struct SingletonService(u64);
    struct ScopedService(u64);
    struct TransientService(u64);

    let mut sc = ServiceCollection::new();
    sc.add_instance(SingletonService(1));
    sc.add_scoped_factory::<ScopedService, _>(|_| Ok(ScopedService(2)));
    sc.add_transient_factory::<TransientService, _>(|_| Ok(TransientService(3)));

    let sp = sc.build().unwrap();
    let scope = sp.create_scope();

    let _ = sp.get_required::<SingletonService>().unwrap();
    let _ = scope.get_required::<ScopedService>().unwrap();

    c.bench_function("mixed_workload_realistic", |b| {
        b.iter(|| {
            for _ in 0..7 {
                let v = scope.get_required::<SingletonService>().unwrap();
                black_box(v.0);
            }
            for _ in 0..2 {
                let v = scope.get_required::<ScopedService>().unwrap();
                black_box(v.0);
            }
            let v = scope.get_required::<TransientService>().unwrap();
            black_box(v.0);
        })
    });
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_constructor_vs_factory,
    bench_concrete_vs_trait,
    bench_scope_lifecycle,
    bench_explicit_args,
    bench_chain_depth,
    bench_contention
);

criterion_group!(macro_benches, bench_mixed_workload);

criterion_main!(micro_benches, macro_benches);
