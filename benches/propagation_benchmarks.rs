#![allow(clippy::cast_precision_loss)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use uncertain_gum::{INF, Session, UncertainReal, covariance_matrix, sum};

fn declare_inputs(session: &Session, count: usize) -> Vec<UncertainReal> {
    (0..count)
        .map(|i| {
            let value = 1.0 + i as f64 * 0.1;
            session.ureal(value, 0.01 * value, 10.0 + i as f64).unwrap()
        })
        .collect()
}

fn benchmark_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");
    group.measurement_time(Duration::from_secs(5));

    let session = Session::new();
    let v = session.ureal(0.1, 1e-3, INF).unwrap();
    let i = session.ureal(0.015, 0.5e-3, INF).unwrap();

    group.bench_function("quotient", |b| {
        b.iter(|| black_box((&v / &i).unwrap()));
    });

    group.bench_function("transcendental_chain", |b| {
        b.iter(|| {
            let x = v.exp().and_then(|x| x.sin()).and_then(|x| x.try_mul(&i));
            black_box(x.unwrap())
        });
    });

    let inputs = declare_inputs(&session, 100);
    group.bench_function("sum_of_100", |b| {
        b.iter(|| black_box(sum(&inputs).unwrap()));
    });

    group.finish();
}

fn benchmark_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    group.measurement_time(Duration::from_secs(8));

    for count in [10, 100, 1000] {
        let session = Session::new();
        let inputs = declare_inputs(&session, count);
        for pair in inputs.windows(2) {
            session.correlate(&pair[0], &pair[1], 0.2).unwrap();
        }
        let total = sum(&inputs).unwrap();

        group.bench_function(format!("uncertainty_correlated_{count}"), |b| {
            b.iter(|| black_box(total.u().unwrap()));
        });

        group.bench_function(format!("dof_{count}"), |b| {
            b.iter(|| black_box(total.dof().unwrap()));
        });
    }

    group.finish();
}

fn benchmark_covariance_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("covariance_matrix");
    group.measurement_time(Duration::from_secs(10));

    let session = Session::new();
    let inputs = declare_inputs(&session, 200);
    let derived: Vec<_> = inputs
        .windows(4)
        .map(|w| sum(w).and_then(|s| s.try_div(&w[0])).unwrap())
        .collect();

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(covariance_matrix(&derived).unwrap()));
    });

    group.finish();
}

#[cfg(feature = "parallel")]
fn benchmark_parallel_covariance_matrix(c: &mut Criterion) {
    use uncertain_gum::statistics::covariance_matrix_par;

    let mut group = c.benchmark_group("parallel_covariance_matrix");
    group.measurement_time(Duration::from_secs(10));

    for count in [50, 200, 800] {
        let session = Session::new();
        let inputs = declare_inputs(&session, count);
        let derived: Vec<_> = inputs
            .windows(4)
            .map(|w| sum(w).and_then(|s| s.try_div(&w[0])).unwrap())
            .collect();

        group.bench_function(format!("sequential_{count}"), |b| {
            b.iter(|| black_box(covariance_matrix(&derived).unwrap()));
        });

        group.bench_function(format!("parallel_{count}"), |b| {
            b.iter(|| black_box(covariance_matrix_par(&derived).unwrap()));
        });
    }

    group.finish();
}

#[cfg(feature = "parallel")]
criterion_group!(
    benches,
    benchmark_arithmetic,
    benchmark_evaluation,
    benchmark_covariance_matrix,
    benchmark_parallel_covariance_matrix
);

#[cfg(not(feature = "parallel"))]
criterion_group!(
    benches,
    benchmark_arithmetic,
    benchmark_evaluation,
    benchmark_covariance_matrix
);
criterion_main!(benches);
