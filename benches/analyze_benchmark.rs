//! Benchmarks for resume analysis.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use atscore::analyze::{contains_date, count_long_bullets, FileInfo, FormatAnalyzer};

/// A resume-like PDF with `page_count` pages of 40 text lines each.
fn create_resume_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for page in 0..page_count {
        let mut operations = Vec::new();
        for line in 0..40 {
            let size = if line == 0 { 16 } else { 11 };
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
            operations.push(Operation::new(
                "Td",
                vec![72.into(), (760 - line * 16).into()],
            ));
            let text = format!(
                "- Page {} item {}: led a migration in Mar 2021 that cut latency by 40%",
                page + 1,
                line
            );
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(text.as_str())],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_count as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Benchmark PDF header detection.
fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = create_resume_pdf(1);

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| atscore::detect_format_from_bytes(black_box(&pdf_data)).unwrap());
    });
}

/// Benchmark the content-stream walk.
fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");
    for pages in [1, 2, 5] {
        let data = create_resume_pdf(pages);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &data, |b, data| {
            b.iter(|| atscore::parse_bytes(black_box(data)).unwrap());
        });
    }
    group.finish();
}

/// Benchmark metric collection and scoring on an already walked document.
fn bench_scoring(c: &mut Criterion) {
    let data = create_resume_pdf(2);
    let document = atscore::parse_bytes(&data).unwrap();
    let analyzer = FormatAnalyzer::new();
    let file = FileInfo::new(".pdf", data.len() as u64);

    c.bench_function("analyze_document", |b| {
        b.iter(|| analyzer.analyze_document(black_box(&document), file.clone()));
    });
}

/// Benchmark the text checks on a large buffer.
fn bench_text_checks(c: &mut Criterion) {
    let line = "- led a migration in Mar 2021 that cut latency by 40% across three services";
    let text = vec![line; 500].join("\n");

    c.bench_function("contains_date", |b| {
        b.iter(|| contains_date(black_box(&text)));
    });
    c.bench_function("count_long_bullets", |b| {
        b.iter(|| count_long_bullets(black_box(&text), 20));
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_walk,
    bench_scoring,
    bench_text_checks
);
criterion_main!(benches);
