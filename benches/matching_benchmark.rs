use chrono::Utc;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use bank_ui_harness::assertion::{find_match, matches_text};
use bank_ui_harness::capture::artifact_name;

fn page_text() -> String {
    let mut lines = vec!["Transfer Funds".to_string(), "Error!".to_string()];
    lines.extend((0..200).map(|i| format!("{}  $515.50", 12345 + i)));
    lines.push("Cannot transfer to the same account".to_string());
    lines.join("\n")
}

fn benchmark_matching(c: &mut Criterion) {
    let text = page_text();

    c.bench_function("matches_text_hit", |b| {
        b.iter(|| matches_text(black_box(&text), black_box("CANNOT TRANSFER TO THE SAME ACCOUNT")))
    });

    c.bench_function("matches_text_miss", |b| {
        b.iter(|| matches_text(black_box(&text), black_box("Transfer Complete")))
    });

    c.bench_function("find_match_line", |b| {
        b.iter(|| find_match(black_box(&text), black_box("cannot transfer")))
    });
}

fn benchmark_naming(c: &mut Criterion) {
    let now = Utc::now();

    c.bench_function("artifact_name", |b| {
        b.iter(|| {
            artifact_name(
                black_box(42),
                black_box("error_message_shown_Passwords did not match"),
                &now,
            )
        })
    });
}

criterion_group!(benches, benchmark_matching, benchmark_naming);
criterion_main!(benches);
