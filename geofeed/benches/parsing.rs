//! Benchmarks pour le parsing et le filtrage GeoJSON

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Génère une FeatureCollection avec un Polygon toutes les 10 features
fn generate_collection(count: usize) -> Vec<u8> {
    let features: Vec<String> = (0..count)
        .map(|i| {
            if i % 10 == 0 {
                r#"{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]},"properties":{}}"#.to_string()
            } else {
                format!(
                    r#"{{"type":"Feature","geometry":{{"type":"Point","coordinates":[{:.6},{:.6}]}},"properties":{{"name":"city-{}","population":{}}}}}"#,
                    (i % 360) as f64 - 180.0 + 0.123456,
                    (i % 180) as f64 - 90.0 + 0.654321,
                    i,
                    i * 17
                )
            }
        })
        .collect();

    format!(
        r#"{{"type":"FeatureCollection","features":[{}]}}"#,
        features.join(",")
    )
    .into_bytes()
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_rows");

    for count in [100usize, 10_000] {
        let doc = generate_collection(count);
        group.throughput(Throughput::Bytes(doc.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter(|| {
                let result = geofeed::extract_rows(black_box(doc)).unwrap();
                black_box(result)
            })
        });
    }

    group.finish();
}

fn bench_parse_only(c: &mut Criterion) {
    let doc = generate_collection(10_000);

    c.bench_function("parse_feature_collection_10k", |b| {
        b.iter(|| {
            let features = geofeed::parse_feature_collection(black_box(&doc)).unwrap();
            black_box(features)
        })
    });
}

criterion_group!(benches, bench_extract, bench_parse_only);
criterion_main!(benches);
