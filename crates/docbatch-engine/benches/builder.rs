use criterion::{Criterion, criterion_group, criterion_main};
use docbatch_engine::{BatchBuilder, ContentBlock, IndexUnit, Strategy, replay};

fn generate_blocks(count: usize) -> Vec<ContentBlock> {
    (0..count)
        .map(|i| {
            ContentBlock::new(
                format!("Field {i}:"),
                format!("Value {i} with some longer body text\nand a second line"),
            )
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    let blocks = generate_blocks(200);

    for strategy in [Strategy::Forward, Strategy::Reverse] {
        let builder = BatchBuilder::new(1).with_strategy(strategy);
        group.bench_function(format!("{strategy:?}"), |b| {
            b.iter(|| {
                let batch = builder.build(std::hint::black_box(&blocks)).unwrap();
                std::hint::black_box(batch.transmission_order());
            });
        });
    }

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    group.sample_size(10);

    let ops = BatchBuilder::new(1)
        .build(&generate_blocks(50))
        .unwrap()
        .transmission_order();

    group.bench_function("forward_50_blocks", |b| {
        b.iter(|| {
            let doc = replay("", std::hint::black_box(&ops), IndexUnit::Chars).unwrap();
            std::hint::black_box(doc);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_replay);
criterion_main!(benches);
