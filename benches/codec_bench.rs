use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use huffcode::{compress, decompress, CodeTable, FrequencyTable, HuffmanTree};
use rand::{Rng, SeedableRng};

fn skewed_data(len: usize) -> Vec<u8> {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(0xDEADBEEF);
    // the minimum of two draws favours low byte values, like text does
    (0..len)
        .map(|_| rng.gen::<u8>().min(rng.gen::<u8>()))
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    const DATA_SIZE: usize = 1024 * 1024;
    let data = skewed_data(DATA_SIZE);
    let (table, compressed) = compress(&data).unwrap();

    let mut group = c.benchmark_group("huffman");
    group.throughput(Throughput::Bytes(DATA_SIZE as u64));

    group.bench_function("build table", |b| {
        b.iter(|| {
            let tree = HuffmanTree::build(&FrequencyTable::from_bytes(black_box(&data))).unwrap();
            CodeTable::from_tree(&tree)
        })
    });
    group.bench_function("encode", |b| b.iter(|| compress(black_box(&data)).unwrap()));
    group.bench_function("decode", |b| {
        b.iter(|| decompress(&table, black_box(&compressed)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
