use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fluentnet::http::StatusRange;
use fluentnet::settings::SettingsScope;
use fluentnet::URLRequestContext;
use std::time::Duration;

fn benchmark_resolve_through_chain(c: &mut Criterion) {
    let context = URLRequestContext::new();
    let client = SettingsScope::child_of(context.settings());
    client.set_timeout(Some(Duration::from_secs(5)));
    let request = SettingsScope::child_of(&client);
    let settings = context.resolver_for(&request);

    c.bench_function("settings_resolve_redirects", |b| {
        b.iter(|| black_box(settings.redirects()))
    });

    c.bench_function("settings_resolve_timeout", |b| {
        b.iter(|| black_box(settings.timeout()))
    });
}

fn benchmark_status_range(c: &mut Criterion) {
    c.bench_function("status_range_parse", |b| {
        b.iter(|| StatusRange::parse(black_box("100,3xx,404-410,5**")))
    });

    let range = StatusRange::parse("100,3xx,404-410,5**").unwrap();
    c.bench_function("status_range_match", |b| {
        b.iter(|| {
            for status in [200u16, 302, 404, 418, 503] {
                black_box(range.matches(black_box(status)));
            }
        })
    });
}

criterion_group!(benches, benchmark_resolve_through_chain, benchmark_status_range);
criterion_main!(benches);
