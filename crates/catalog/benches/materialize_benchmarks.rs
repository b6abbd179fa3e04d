use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use miniforge_catalog::{CatalogViewController, Facet, SortKey};
use miniforge_products::Product;

/// Synthetic catalog: every fourth product belongs to a set of four.
fn synthetic_catalog(size: usize) -> Vec<Product> {
    (0..size)
        .map(|i| {
            let mut product = Product::new(i.to_string(), format!("Mini {i}"), (i as u64 % 97) * 100)
                .with_category(if i % 2 == 0 { "Fantasy" } else { "Sci-Fi" })
                .with_size(if i % 3 == 0 { "28mm" } else { "32mm" })
                .with_weapon("Sword / Axe");
            if i % 4 != 0 {
                product = product.with_set(&format!("Set {}", i / 4));
            }
            product
        })
        .collect()
}

fn bench_materialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize");

    for size in [100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));

        let grouped = CatalogViewController::default().with_catalog(synthetic_catalog(size));
        group.bench_with_input(BenchmarkId::new("grouped_newest", size), &grouped, |b, c| {
            b.iter(|| black_box(c.view()))
        });

        let mut bypassed = grouped.clone();
        bypassed.select(Facet::Size, "28mm");
        bypassed.set_sort(SortKey::PriceDesc);
        group.bench_with_input(BenchmarkId::new("size_filtered_price", size), &bypassed, |b, c| {
            b.iter(|| black_box(c.view()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_materialize);
criterion_main!(benches);
