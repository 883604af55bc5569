//! Benchmarks for memberlog parsing and loading.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench parsing -- transcript`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use memberlog::config::ParserConfig;
use memberlog::identity::identify;
use memberlog::parser::TranscriptParser;
use memberlog::parsing::{classify_line, split_subjects};
use memberlog::sink::{EventSink, SqliteSink};

// =============================================================================
// Test Data Generators
// =============================================================================

/// A transcript where roughly one line in four is a membership event.
fn generate_transcript(count: usize) -> String {
    let mut lines = Vec::with_capacity(count);
    for i in 0..count {
        let day = i / 1440 % 28 + 1;
        let hour = i / 60 % 24;
        let minute = i % 60;
        let prefix = format!("{}/3/2023, {}:{:02} - ", day, hour, minute);
        let body = match i % 8 {
            0 => format!("+52 55 {:04} {:04} se unió con el enlace del grupo", i % 10_000, i / 7),
            2 => format!("~\u{202f}Usuario {} salió del grupo", i),
            4 => format!("+1 234 añadió a +1 {:03}, +1 {:03} y ~ Ana", i % 1000, (i + 1) % 1000),
            6 => format!("Se añadió a ~\u{202f}Invitado {}.", i),
            _ => format!("+52 55 1234 5678: Mensaje número {}", i),
        };
        lines.push(format!("{}{}", prefix, body));
    }
    lines.join("\n")
}

// =============================================================================
// Parsing Benchmarks
// =============================================================================

fn bench_transcript_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("transcript_parsing");

    for (label, anonymize) in [("raw", false), ("hashed", true)] {
        let parser = TranscriptParser::with_config(ParserConfig::new().with_anonymize(anonymize));
        for size in [1_000_usize, 10_000, 50_000] {
            let transcript = generate_transcript(size);
            group.throughput(Throughput::Elements(size as u64));
            group.bench_with_input(
                BenchmarkId::new(label, size),
                &transcript,
                |b, transcript| {
                    b.iter(|| {
                        let events = parser.parse_str(black_box(transcript), "Bench").unwrap();
                        black_box(events)
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_classify_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_line");
    let cases = [
        ("joined", "15/3/2023, 14:22 - +52 55 1234 5678 se unió con el enlace del grupo"),
        ("added_by_member", "16/3/2023, 08:05 - +1 234 añadió a +1 111, +1 222 y +1 333"),
        ("chat_message", "15/3/2023, 14:25 - +52 55 1234 5678: Hola a todos"),
        ("continuation", "y esto sigue el mensaje anterior"),
    ];
    for (name, line) in cases {
        group.bench_function(name, |b| b.iter(|| black_box(classify_line(black_box(line)))));
    }
    group.finish();
}

fn bench_split_subjects(c: &mut Criterion) {
    c.bench_function("split_subjects", |b| {
        b.iter(|| {
            black_box(split_subjects(black_box(
                "+1 111, +1 222, \u{200e}~\u{202f}Bob, +1 333 y ~ Ana.",
            )))
        });
    });
}

fn bench_identify(c: &mut Criterion) {
    let mut group = c.benchmark_group("identify");
    let raw = "\u{200e}+52 55 1234 5678";
    group.bench_function("normalize", |b| b.iter(|| identify(black_box(raw), false)));
    group.bench_function("hash", |b| b.iter(|| identify(black_box(raw), true)));
    group.finish();
}

// =============================================================================
// Loading Benchmarks
// =============================================================================

fn bench_sqlite_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqlite_load");
    let events = TranscriptParser::new()
        .parse_str(&generate_transcript(10_000), "Bench")
        .unwrap();

    for chunk_size in [100_usize, 500] {
        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut sink = SqliteSink::open_in_memory()
                        .unwrap()
                        .with_chunk_size(chunk_size);
                    black_box(sink.load(&events).unwrap())
                });
            },
        );
    }
    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_transcript_parsing,
    bench_classify_line,
    bench_split_subjects,
    bench_identify,
    bench_sqlite_load,
);

criterion_main!(benches);
