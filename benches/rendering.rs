//! Preview and editor benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uigen::color_space::{preview_background, to_terminal_color};
use uigen::editor::TextBuffer;
use uigen::preview::{escape_attribute, render_markup, sandboxed_document, PreviewRenderer};
use uigen::terminal_capabilities::ColorSupport;

fn create_test_markup(sections: usize) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><style>body{margin:0}</style></head><body>");
    for i in 0..sections {
        html.push_str(&format!(
            "<section class=\"card\"><h2>Product {i} &amp; more</h2>\
             <p>Lightweight, breathable and made for <b>long</b> walks.</p>\
             <ul><li>Colour {i}</li><li>Size &lt;{i}&gt;</li></ul><hr>\
             <button onclick=\"buy('{i}')\">Buy now</button></section>"
        ));
    }
    html.push_str("<script>console.log('ready')</script></body></html>");
    html
}

fn benchmark_render_markup(c: &mut Criterion) {
    let mut group = c.benchmark_group("Markup Rendering");

    for sections in [10, 100, 1000].iter() {
        let markup = create_test_markup(*sections);
        group.bench_function(format!("sections_{}", sections), |b| {
            b.iter(|| render_markup(black_box(&markup)))
        });
    }

    group.finish();
}

fn benchmark_preview_sync(c: &mut Criterion) {
    let markup = create_test_markup(100);
    let palette = vec!["#1e293b".to_string(), "#f97316".to_string()];

    let mut group = c.benchmark_group("Preview Sync");

    group.bench_function("new_revision", |b| {
        let mut renderer = PreviewRenderer::new();
        let mut revision = 0u64;
        b.iter(|| {
            revision += 1;
            renderer.sync(black_box(revision), black_box(&markup), black_box(&palette))
        })
    });

    group.bench_function("same_revision", |b| {
        let mut renderer = PreviewRenderer::new();
        renderer.sync(1, &markup, &palette);
        b.iter(|| renderer.sync(black_box(1), black_box(&markup), black_box(&palette)))
    });

    group.finish();
}

fn benchmark_sandboxed_document(c: &mut Criterion) {
    let markup = create_test_markup(100);
    let background = preview_background(&["#fafafa".to_string()]);

    let mut group = c.benchmark_group("Sandboxed Document");

    group.bench_function("escape_attribute", |b| {
        b.iter(|| escape_attribute(black_box(&markup)))
    });

    group.bench_function("document", |b| {
        b.iter(|| sandboxed_document(black_box(&markup), black_box(background)))
    });

    group.finish();
}

fn benchmark_background_colors(c: &mut Criterion) {
    let palette = vec!["rebeccapurple".to_string(), "#0f172a".to_string()];
    let background = preview_background(&palette);

    let mut group = c.benchmark_group("Background Colors");

    group.bench_function("resolve_palette", |b| {
        b.iter(|| preview_background(black_box(&palette)))
    });

    for support in [ColorSupport::Color16, ColorSupport::Color256, ColorSupport::TrueColor].iter() {
        group.bench_function(format!("{:?}", support), |b| {
            b.iter(|| to_terminal_color(black_box(background), black_box(*support)))
        });
    }

    group.finish();
}

fn benchmark_editor_typing(c: &mut Criterion) {
    let markup = create_test_markup(100);

    let mut group = c.benchmark_group("Editor");

    group.bench_function("insert_mid_document", |b| {
        b.iter_batched(
            || {
                let mut buffer = TextBuffer::new(&markup);
                for _ in 0..200 {
                    buffer.move_down();
                }
                buffer
            },
            |mut buffer| {
                for ch in "<span>edit</span>".chars() {
                    buffer.insert_char(black_box(ch));
                }
                buffer
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("cursor_sweep", |b| {
        let mut buffer = TextBuffer::new(&markup);
        b.iter(|| {
            buffer.home();
            for _ in 0..80 {
                buffer.move_right();
            }
            buffer.end();
            black_box(buffer.display_column())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_render_markup,
    benchmark_preview_sync,
    benchmark_sandboxed_document,
    benchmark_background_colors,
    benchmark_editor_typing,
);

criterion_main!(benches);
