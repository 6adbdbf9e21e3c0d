//! Benchmarks for type guessing and translation over generated delimited text.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rust_data_translation::config::ConfigurationOptions;
use rust_data_translation::source::{CsvOptions, CsvSource};
use rust_data_translation::translate::{ReadOptions, Translator};

fn generate_csv(rows: usize) -> String {
    let mut out = String::from("id,score,flag,day,note\n");
    for i in 0..rows {
        let score = if i % 97 == 0 {
            "n/a".to_string()
        } else {
            format!("{:.2}", i as f64 * 0.37)
        };
        let flag = if i % 3 == 0 { "yes" } else { "no" };
        out.push_str(&format!(
            "{i},{score},{flag},2024-{:02}-{:02},item {}\n",
            i % 12 + 1,
            i % 28 + 1,
            i % 50
        ));
    }
    out
}

fn translator_for(text: &str) -> Translator<CsvSource> {
    let source = CsvSource::from_text(text, CsvOptions::default()).expect("csv text must open");
    Translator::new(source)
}

fn bench_guess(c: &mut Criterion) {
    let mut group = c.benchmark_group("guess");
    for rows in [1_000usize, 10_000] {
        let text = generate_csv(rows);
        group.bench_with_input(BenchmarkId::new("probe_100", rows), &text, |b, text| {
            b.iter(|| {
                let translator = translator_for(text);
                let mut config = translator
                    .configure(&ConfigurationOptions::default())
                    .expect("configure must succeed");
                black_box(
                    translator
                        .guess_value_types(&mut config, 100, None)
                        .expect("guess must succeed"),
                )
            });
        });
        group.bench_with_input(BenchmarkId::new("full_scan", rows), &text, |b, text| {
            b.iter(|| {
                let translator = translator_for(text);
                let mut config = translator
                    .configure(&ConfigurationOptions::default())
                    .expect("configure must succeed");
                black_box(
                    translator
                        .guess_value_types(&mut config, 0, None)
                        .expect("guess must succeed"),
                )
            });
        });
    }
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    for rows in [1_000usize, 10_000] {
        let text = generate_csv(rows);
        let translator = translator_for(&text);
        let mut config = translator
            .configure(&ConfigurationOptions::default())
            .expect("configure must succeed");
        translator
            .guess_value_types(&mut config, 100, None)
            .expect("guess must succeed");

        group.bench_with_input(BenchmarkId::new("fault_tolerant", rows), &config, |b, config| {
            b.iter(|| {
                black_box(
                    translator
                        .read(config, &ReadOptions::default(), None)
                        .expect("read must succeed"),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_guess, bench_read);
criterion_main!(benches);
