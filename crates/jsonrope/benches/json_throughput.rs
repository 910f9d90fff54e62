//! Benchmark – stringify/parse throughput on a synthetic document.
#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use jsonrope::{Runtime, parse, stringify};

/// Deterministic document: an array of small records, roughly `records * 64`
/// bytes of JSON text.
fn make_document(rt: &Runtime, records: usize) -> jsonrope::Str {
    let mut text = String::with_capacity(records * 64);
    text.push('[');
    for i in 0..records {
        if i > 0 {
            text.push(',');
        }
        text.push_str(&format!(
            r#"{{"id":{i},"name":"record-{i}","flags":[true,false,null]}}"#
        ));
    }
    text.push(']');
    rt.str_from_str(&text)
}

fn bench_parse(c: &mut Criterion) {
    let rt = Runtime::new();
    let doc = make_document(&rt, 1_000);
    c.bench_function("parse_1k_records", |b| {
        b.iter(|| {
            let value = parse(&rt, black_box(&doc), None).unwrap();
            black_box(value)
        });
    });
}

fn bench_stringify(c: &mut Criterion) {
    let rt = Runtime::new();
    let doc = make_document(&rt, 1_000);
    let value = parse(&rt, &doc, None).unwrap();
    c.bench_function("stringify_1k_records", |b| {
        b.iter(|| {
            let text = stringify(&rt, black_box(&value), None, None)
                .unwrap()
                .unwrap();
            black_box(text)
        });
    });
}

criterion_group!(benches, bench_parse, bench_stringify);
criterion_main!(benches);
