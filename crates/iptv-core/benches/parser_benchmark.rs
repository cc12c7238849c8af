//! Benchmark tests for iptv-core parsing
//!
//! Run with: cargo bench -p iptv-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use iptv_core::{parse, resolve_source, search, PlaylistParser, ProxyEndpoint};

// ============================================================================
// Helpers
// ============================================================================

fn create_playlist(entries: usize) -> String {
    let mut text = String::from("#EXTM3U\n");
    for i in 0..entries {
        text.push_str(&format!(
            "#EXTINF:-1 tvg-id=\"ch{i}\" tvg-logo=\"https://logo.example.com/{i}.png\" group-title=\"Group {}\",Channel {i}\n",
            i % 12
        ));
        if i % 10 == 0 {
            text.push_str("#EXTVLCOPT:http-user-agent=Mozilla/5.0\n");
        }
        text.push_str(&format!("https://live.example.com/{i}/index.m3u8\n"));
    }
    text
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("playlist_parse");
    for size in [10, 1_000, 10_000] {
        let text = create_playlist(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| parse(black_box(text)))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let channels = parse(&create_playlist(5_000));
    c.bench_function("channel_search", |b| {
        b.iter(|| search(black_box(&channels), black_box("group 7")).len())
    });
}

fn bench_resolve(c: &mut Criterion) {
    let text = create_playlist(1_000);
    let parser = PlaylistParser::default();
    let proxy = ProxyEndpoint::default();
    c.bench_function("resolve_playlist", |b| {
        b.iter(|| {
            resolve_source(
                black_box("https://lists.example.com/tv.m3u"),
                Some("audio/x-mpegurl"),
                black_box(&text),
                &parser,
                &proxy,
            )
        })
    });
}

criterion_group!(benches, bench_parse, bench_search, bench_resolve);
criterion_main!(benches);
