//! Contention Benchmarks
//!
//! Cost of a full coordinated run under each protection policy:
//! - none: racy load/store, loses updates
//! - mutex: parking_lot mutex per increment
//! - spin: spin lock with exponential backoff per increment
//!
//! Run with: cargo bench --bench contention

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use race_counter::{run, Protection};

/// Thread counts to test
const THREAD_COUNTS: &[i64] = &[1, 2, 4, 8];

const LOOPS_PER_THREAD: i64 = 10_000;

fn bench_protection(c: &mut Criterion) {
    let mut group = c.benchmark_group("coordinated_run");
    group.measurement_time(Duration::from_secs(5));

    for protection in [Protection::Unprotected, Protection::Mutex, Protection::Spin] {
        for &threads in THREAD_COUNTS {
            group.bench_with_input(
                BenchmarkId::new(protection.as_str(), threads),
                &threads,
                |b, &threads| {
                    b.iter(|| {
                        let report = run(threads, LOOPS_PER_THREAD, protection)
                            .expect("valid configuration");
                        black_box(report.actual)
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_protection);
criterion_main!(benches);
