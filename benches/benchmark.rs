use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avl_dhash::{AvlTree, HashArray};

const N: usize = 100_000;

pub fn tree_benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("tree_insert", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for value in &values {
                tree.insert(*value);
            }
            tree
        })
    });

    let tree: AvlTree<i32> = values.iter().copied().collect();

    c.bench_function("tree_contains", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.contains(value));
            }
        })
    });

    c.bench_function("tree_iter", |b| {
        b.iter(|| {
            for key in &tree {
                black_box(key);
            }
        })
    });

    c.bench_function("tree_remove", |b| {
        b.iter(|| {
            let mut tree = tree.clone();
            for value in &values {
                tree.remove(value);
            }
        })
    });
}

pub fn array_benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let keys: Vec<String> = (1..=N).map(|_| rng.gen::<u64>().to_string()).collect();

    c.bench_function("array_add", |b| {
        b.iter(|| {
            let mut array = HashArray::new();
            for key in &keys {
                black_box(array.add(key.clone(), key.len()).unwrap());
            }
            array
        })
    });

    let mut array = HashArray::new();
    for key in &keys {
        array.add(key.clone(), key.len()).unwrap();
    }

    c.bench_function("array_find", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(array.find(key).unwrap());
            }
        })
    });

    c.bench_function("array_remove_add", |b| {
        b.iter(|| {
            for key in keys.iter().take(N / 10) {
                array.remove(key).unwrap();
                array.add(key.clone(), key.len()).unwrap();
            }
        })
    });
}

criterion_group!(benches, tree_benchmarks, array_benchmarks);
criterion_main!(benches);
