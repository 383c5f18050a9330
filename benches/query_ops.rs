//! Benchmarks for collection-wide operations.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use book_ledger::library::model::{BookDraft, BookRecord, ReadingStatus, now};
use book_ledger::library::{BookFilter, normalize};
use book_ledger::recommend::{PromptRequest, build_prompt, read_books, seed_lines};

fn collection(n: usize) -> Vec<BookRecord> {
    let stamp = now();
    (0..n)
        .map(|i| {
            normalize(
                BookDraft {
                    title: Some(format!("Book {i}")),
                    author: Some(format!("Author {}", i % 97)),
                    status: Some(ReadingStatus::ALL[i % 3]),
                    progress: Some((i % 101) as i64),
                    favorite: Some(i % 4 == 0),
                    tags: Some(vec![format!("tag{}", i % 7), format!("Tag{}", i % 11)]),
                    ..Default::default()
                },
                stamp,
            )
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let books = collection(10_000);
    let filter = BookFilter {
        text: Some("author 4".into()),
        favorites_only: true,
        ..Default::default()
    }
    .with_tag_list("TAG3");

    c.bench_function("filter_10k", |bench| {
        bench.iter(|| black_box(filter.apply(&books).len()))
    });
}

fn bench_normalize(c: &mut Criterion) {
    let books = collection(1_000);
    let stamp = now();

    c.bench_function("renormalize_1k", |bench| {
        bench.iter(|| {
            for book in &books {
                black_box(normalize(book.to_draft(), stamp));
            }
        })
    });
}

fn bench_prompt(c: &mut Criterion) {
    let books = collection(10_000);
    let request = PromptRequest::default();

    c.bench_function("build_prompt_10k", |bench| {
        bench.iter(|| {
            let seeds = read_books(&books);
            let lines = seed_lines(&seeds, request.favorites_only);
            black_box(build_prompt(&request, &lines))
        })
    });
}

criterion_group!(benches, bench_filter, bench_normalize, bench_prompt);
criterion_main!(benches);
