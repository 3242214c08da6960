use criterion::{Criterion, criterion_group, criterion_main};
use mime::Mime;
use std::hint::black_box;
use uniform_http::data::{Encoding, Form, Preference, Range, Tag};
use uniform_http::message::{Request, Response};
use uniform_http::representation::StringRepresentation;

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

fn bench_preferences(c: &mut Criterion) {
    let candidates = [mime::APPLICATION_JSON, mime::TEXT_HTML];

    c.bench_function("parse_accept_header", |b| {
        b.iter(|| {
            let preferences = Preference::<Mime>::parse_header(black_box(ACCEPT));
            black_box(Preference::best_match(&preferences, &candidates));
        });
    });

    c.bench_function("parse_accept_encoding_header", |b| {
        b.iter(|| black_box(Preference::<Encoding>::parse_header(black_box("gzip, deflate, br;q=0.9, zstd"))));
    });
}

fn bench_simple_values(c: &mut Criterion) {
    c.bench_function("parse_tag_list", |b| {
        b.iter(|| black_box(Tag::parse_list(black_box("W/\"a1\", \"b2\", \"c3\""))));
    });

    c.bench_function("parse_range_header", |b| {
        b.iter(|| black_box(Range::parse_header(black_box("bytes=0-499,500-999,-200"))));
    });

    c.bench_function("parse_query_form", |b| {
        b.iter(|| black_box(Form::parse(black_box("q=uniform+chain&page=2&sort=desc&tag=a%26b"), Form::QUERY_SEPARATOR)));
    });
}

fn bench_messages(c: &mut Criterion) {
    let (parts, ()) = http::Request::builder()
        .uri("/index.html?lang=en")
        .header("User-Agent", "bench")
        .header("Accept", ACCEPT)
        .header("Accept-Encoding", "gzip, br")
        .header("If-None-Match", "W/\"v1\"")
        .header("Cookie", "sid=abc; theme=dark")
        .body(())
        .unwrap()
        .into_parts();

    c.bench_function("request_from_parts", |b| {
        b.iter(|| black_box(Request::from(parts.clone())));
    });

    c.bench_function("response_to_head", |b| {
        let mut response = Response::new();
        response.set_entity(Box::new(StringRepresentation::plain("Hello World!").with_tag(Tag::strong("v2"))));
        b.iter(|| black_box(response.to_head()));
    });
}

criterion_group!(benches, bench_preferences, bench_simple_values, bench_messages);
criterion_main!(benches);
