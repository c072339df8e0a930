use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kbrow::core::binary;
use kbrow::core::catalog::NNSA_AMP_DESCRIPT;
use kbrow::core::db;
use kbrow::core::row::Row;
use kbrow::core::text::{self, TextOptions};
use kbrow::core::time;
use std::time::Duration;

fn sample_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let mut row = Row::new(&NNSA_AMP_DESCRIPT);
            row.set_int("windowid", i as i64)
                .unwrap()
                .set_text("sta", "ABKT")
                .unwrap()
                .set_text("chan", "BHZ")
                .unwrap()
                .set_text("phase", "Lg")
                .unwrap()
                .set_float("delta", 12.5 + i as f64)
                .unwrap()
                .set_float("start_time", 1_234_567_890.0 + i as f64)
                .unwrap()
                .set_int("orid", 1000 + i as i64)
                .unwrap()
                .set_text("auth", "bench")
                .unwrap();
            row
        })
        .collect()
}

/// Text render and parse of single rows
fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("text");
    let rows = sample_rows(1);
    let order = NNSA_AMP_DESCRIPT.default_order();
    let opts = TextOptions::default();
    let line = text::render_line(&rows[0], &order, &opts);

    group.bench_function("render_line", |b| {
        b.iter(|| black_box(text::render_line(&rows[0], &order, &opts)));
    });
    group.bench_function("parse_line", |b| {
        b.iter(|| black_box(text::parse_line(&NNSA_AMP_DESCRIPT, &order, &line, &opts).unwrap()));
    });
    group.finish();
}

/// Binary encode and decode of single rows
fn bench_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary");
    let rows = sample_rows(1);
    let bytes = binary::encode(&rows[0]);

    group.bench_function("encode", |b| {
        b.iter(|| black_box(binary::encode(&rows[0])));
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(binary::decode(&NNSA_AMP_DESCRIPT, &mut bytes.as_slice()).unwrap()));
    });
    group.finish();
}

/// Batch inserts into an in-memory SQLite database
fn bench_sqlite_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqlite_batch");
    group.measurement_time(Duration::from_secs(10));

    for size in [10, 100, 1000] {
        let rows = sample_rows(size);
        group.bench_with_input(BenchmarkId::new("write_rows", size), &rows, |b, rows| {
            b.iter(|| {
                let conn = db::db_connect(":memory:").unwrap();
                db::create_table(&conn, &NNSA_AMP_DESCRIPT, "nnsa_amp_descript", true, true)
                    .unwrap();
                black_box(
                    db::write_rows(&conn, "nnsa_amp_descript", rows, time::lddate_now(), true)
                        .unwrap(),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_text, bench_binary, bench_sqlite_batch);
criterion_main!(benches);
