//! Benchmarks for feed decoding and book replay throughput.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lob_depth_replay::{
    encode_feed, BookConfig, FeedDecoder, FeedMessage, MultiSymbolBook, OrderBook, OrderEvent,
    Replayer, Side, SnapshotUpdate, Symbol, VecSource,
};

const SYMBOLS: [&str; 4] = ["AAA", "BBB", "CCC", "DDD"];

/// Deterministic mixed stream: every order is added, traded once, then
/// updated or deleted, so the book stays bounded.
fn create_test_messages(count: usize) -> Vec<FeedMessage> {
    let mut messages = Vec::with_capacity(count);
    let base_price: u32 = 10_000;
    let mut seq: u32 = 0;
    let mut i: u64 = 0;

    while messages.len() + 4 <= count {
        let symbol = Symbol::new(SYMBOLS[(i % 4) as usize]).unwrap();
        let order_id = i + 1;
        let side = if i % 2 == 0 { Side::Bid } else { Side::Ask };
        let offset = (i % 20) as u32;
        let price = match side {
            Side::Bid => base_price - offset,
            Side::Ask => base_price + 1 + offset,
        };
        let size = (i % 100) + 10;

        let mut push = |event| {
            seq += 1;
            messages.push(FeedMessage::new(seq, event));
        };

        push(OrderEvent::add(symbol, order_id, side, size, price));
        push(OrderEvent::trade(symbol, order_id, side, 5));
        if i % 3 == 0 {
            push(OrderEvent::update(symbol, order_id, side, size / 2 + 1, price + 1));
        }
        push(OrderEvent::delete(symbol, order_id, side));
        i += 1;
    }

    messages
}

fn bench_order_book(c: &mut Criterion) {
    let messages = create_test_messages(10_000);
    let symbol = Symbol::new("AAA").unwrap();
    let events: Vec<OrderEvent> = messages
        .iter()
        .map(|m| m.event)
        .filter(|e| e.symbol() == symbol)
        .collect();

    let mut group = c.benchmark_group("order_book");
    group.throughput(Throughput::Elements(events.len() as u64));

    for depth in [1usize, 5, 20] {
        group.bench_function(format!("process_depth_{depth}"), |b| {
            b.iter(|| {
                let mut book = OrderBook::new(BookConfig::new(depth).unwrap());
                for event in &events {
                    let _ = black_box(book.process(event));
                }
            })
        });
    }

    group.finish();
}

fn bench_multi_symbol(c: &mut Criterion) {
    let messages = create_test_messages(10_000);

    let mut group = c.benchmark_group("multi_symbol");
    group.throughput(Throughput::Elements(messages.len() as u64));

    group.bench_function("process_messages", |b| {
        b.iter(|| {
            let mut books = MultiSymbolBook::new(BookConfig::new(5).unwrap());
            for msg in &messages {
                let _ = black_box(books.process(msg));
            }
        })
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let messages = create_test_messages(10_000);
    let bytes = encode_feed(&messages);

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("feed_decoder", |b| {
        b.iter(|| {
            let decoder = FeedDecoder::new(bytes.as_slice());
            black_box(decoder.count())
        })
    });

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let messages = create_test_messages(10_000);

    let mut group = c.benchmark_group("replay");
    group.throughput(Throughput::Elements(messages.len() as u64));

    group.bench_function("vec_source_to_vec_sink", |b| {
        b.iter(|| {
            let mut sink: Vec<SnapshotUpdate> = Vec::new();
            let mut replayer = Replayer::new(BookConfig::new(5).unwrap());
            replayer
                .run(VecSource::new(messages.clone()), &mut sink)
                .unwrap();
            black_box(sink.len())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_order_book,
    bench_multi_symbol,
    bench_decode,
    bench_replay
);
criterion_main!(benches);
