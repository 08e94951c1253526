use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fastmatcher::{ACAutomaton, Matcher};

// Test data generators
fn generate_patterns(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("pattern_{}", i)).collect()
}

fn generate_text(size: usize, match_rate: &str) -> Vec<u8> {
    let mut text = Vec::with_capacity(size);
    let mut i = 0usize;
    while text.len() < size {
        match match_rate {
            "none" => text.extend_from_slice(format!("nomatch{} ", i).as_bytes()),
            "low" => {
                if i % 10 == 0 {
                    text.extend_from_slice(format!("pattern_{} ", i % 100).as_bytes());
                } else {
                    text.extend_from_slice(format!("nomatch{} ", i).as_bytes());
                }
            }
            "high" => text.extend_from_slice(format!("pattern_{} ", i % 100).as_bytes()),
            _ => unreachable!(),
        }
        i += 1;
    }
    text.truncate(size);
    text
}

fn bench_automaton_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("automaton_build");

    for count in [10, 100, 1000] {
        let patterns = generate_patterns(count);
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &patterns,
            |b, patterns| {
                b.iter(|| {
                    let ac = ACAutomaton::build(black_box(patterns)).unwrap();
                    black_box(ac.stats())
                });
            },
        );
    }
    group.finish();
}

fn bench_batch_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_scan");
    let patterns = generate_patterns(100);

    for rate in ["none", "low", "high"] {
        let text = generate_text(64 * 1024, rate);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rate), &text, |b, text| {
            let mut matcher = Matcher::new(&patterns, Vec::<&str>::new(), false).unwrap();
            b.iter(|| {
                let records = matcher.match_bytes(black_box(text)).unwrap();
                black_box(records.len())
            });
        });
    }
    group.finish();
}

fn bench_combined_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("combined_scan");
    let patterns = generate_patterns(100);
    let regexes = [r"\d{4}-\d{2}-\d{2}", r"[a-f0-9]{32}"];
    let text = generate_text(64 * 1024, "low");

    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("literals_plus_regex", |b| {
        let mut matcher = Matcher::new(&patterns, regexes, false).unwrap();
        b.iter(|| {
            let records = matcher.match_bytes(black_box(&text)).unwrap();
            black_box(records.len())
        });
    });
    group.finish();
}

fn bench_streaming_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming_feed");
    let patterns = generate_patterns(100);
    let text = generate_text(64 * 1024, "low");

    for chunk_size in [512usize, 4096, 32 * 1024] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut matcher = Matcher::new(&patterns, Vec::<&str>::new(), true).unwrap();
                    let mut found = 0;
                    for chunk in text.chunks(chunk_size) {
                        found += matcher.feed(black_box(chunk)).unwrap().len();
                    }
                    found += matcher.finish().unwrap().len();
                    black_box(found)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_automaton_build,
    bench_batch_scan,
    bench_combined_scan,
    bench_streaming_feed
);
criterion_main!(benches);
