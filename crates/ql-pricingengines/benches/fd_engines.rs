use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use ql_core::Time;
use ql_instruments::{
    BarrierOption, BarrierType, Exercise, Instrument, OptionType, PlainVanillaPayoff, VanillaOption,
    VanillaStorageOption,
};
use ql_pricingengines::{
    FdBlackScholesBarrierEngine, FdGridSpec, FdHestonVanillaEngine, FdSimpleExtOUStorageEngine,
};
use ql_processes::{
    Discretization, ExtendedOrnsteinUhlenbeckProcess, GeneralizedBlackScholesProcess,
    HestonProcess,
};

fn bench_heston_american(c: &mut Criterion) {
    let process =
        Arc::new(HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.5, 0.04, 0.66, -0.8).unwrap());
    let option = VanillaOption::american(OptionType::Put, 100.0, 1.0).unwrap();
    let mut group = c.benchmark_group("fd_heston_vanilla");
    group.sample_size(10);
    for (t, x, v) in [(50, 50, 25), (100, 100, 50)] {
        let engine =
            FdHestonVanillaEngine::new(Arc::clone(&process)).with_grid(FdGridSpec::new(t, x, v));
        group.bench_function(format!("american_put_{t}x{x}x{v}"), |b| {
            b.iter(|| black_box(option.price(&engine).unwrap().npv))
        });
    }
    group.finish();
}

fn bench_black_scholes_barrier(c: &mut Criterion) {
    let process = Arc::new(GeneralizedBlackScholesProcess::new(100.0, 0.08, 0.04, 0.25).unwrap());
    let engine = FdBlackScholesBarrierEngine::new(process);
    let option = BarrierOption::new(
        Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
        Exercise::european(0.5).unwrap(),
        BarrierType::DownIn,
        95.0,
        3.0,
    );
    c.bench_function("fd_bs_barrier_down_in", |b| {
        b.iter(|| black_box(option.price(&engine).unwrap().npv))
    });
}

fn bench_storage(c: &mut Criterion) {
    let x0 = 3f64.ln();
    let process = Arc::new(
        ExtendedOrnsteinUhlenbeckProcess::new(
            1.0,
            0.5,
            x0,
            Arc::new(move |_: Time| x0),
            Discretization::MidPoint,
        )
        .unwrap(),
    );
    let engine = FdSimpleExtOUStorageEngine::new(process, 0.01);
    let exercise = Exercise::bermudan((1..=12).map(|m| m as Time / 12.0).collect()).unwrap();
    let option = VanillaStorageOption::new(exercise, 5.0, 0.0, 1.0).unwrap();
    let mut group = c.benchmark_group("fd_storage");
    group.sample_size(10);
    group.bench_function("monthly_elevator", |b| {
        b.iter(|| black_box(option.price(&engine).unwrap().npv))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_heston_american,
    bench_black_scholes_barrier,
    bench_storage
);
criterion_main!(benches);
