use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use attribution_core::{
    AttributionMethod, AttributionQuery, AttributionType, EntitySessions, ModelRegistry,
    UserSessionData,
};

const DAY: i64 = 86_400;

fn criterion_benchmark(c: &mut Criterion) {
    let registry = ModelRegistry::default();
    let mut query =
        AttributionQuery::new(AttributionMethod::Linear, AttributionType::EngagementBased);
    query.lookback_days(90).query_period(0, 120 * DAY);
    let window = query.window(100 * DAY);

    // 20 keys with 10 touches each, spread over the last 100 days.
    let sessions: EntitySessions = (0..20)
        .map(|key| {
            let timestamps: Vec<i64> = (0..10).map(|i| (key * 10 + i) * DAY / 2).collect();
            (format!("campaign-{}", key), UserSessionData::from_timestamps(timestamps))
        })
        .collect();

    let mut group = c.benchmark_group("attribute");
    group.throughput(Throughput::Elements(1));
    for method in AttributionMethod::ALL {
        group.bench_function(method.as_str(), |b| {
            b.iter(|| {
                registry.attribute(black_box(method), black_box(&sessions), black_box(&window))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
