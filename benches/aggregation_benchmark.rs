use carbon_tracker::models::{Activity, ActivityDetails, TransportMode};
use carbon_tracker::services::aggregation::aggregate;
use chrono::{Duration, FixedOffset, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// A user's history spread over four weeks, mixing all categories.
fn history(count: usize) -> Vec<Activity> {
    let start = Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap();

    (0..count)
        .map(|i| {
            let details = match i % 3 {
                0 => ActivityDetails::Transport {
                    mode: TransportMode::Car,
                    distance: 5.0 + i as f64 % 40.0,
                },
                1 => ActivityDetails::Energy {
                    electricity: 10.0 + i as f64 % 7.0,
                    natural_gas: 2.0,
                },
                _ => ActivityDetails::Diet {
                    beef: (i % 2) as f64,
                    chicken: 1.0,
                    vegetarian: 2.0,
                },
            };

            Activity {
                id: None,
                user_id: "bench-user".to_string(),
                date: start - Duration::minutes((i as i64 * 97) % (28 * 24 * 60)),
                co2e: 1.0 + (i % 17) as f64 * 0.35,
                details,
            }
        })
        .collect()
}

fn benchmark_aggregate(c: &mut Criterion) {
    let now_utc = Utc.with_ymd_and_hms(2024, 6, 30, 20, 0, 0).unwrap();
    let now_local = now_utc.with_timezone(&FixedOffset::west_opt(7 * 3600).unwrap());

    let mut group = c.benchmark_group("weekly_aggregation");

    for size in [50, 1_000] {
        let activities = history(size);

        group.bench_function(format!("utc_{}", size), |b| {
            b.iter(|| aggregate(black_box(&activities), black_box(&now_utc)))
        });

        group.bench_function(format!("fixed_offset_{}", size), |b| {
            b.iter(|| aggregate(black_box(&activities), black_box(&now_local)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_aggregate);
criterion_main!(benches);
