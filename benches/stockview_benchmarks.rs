use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stockview::*;

const PRODUCTS: [&str; 6] = ["Martillo", "Lámpara", "Taladro", "Manguera", "Clavos", "Sierra"];
const CATEGORIES: [&str; 3] = ["Herramientas", "Hogar", "Jardín"];

fn sales(size: i64) -> Vec<Record> {
    (1..=size)
        .map(|i| {
            let p = (i as usize) % PRODUCTS.len();
            Record::builder()
                .id(i)
                .field("producto_id", p as i64 + 1)
                .field("producto", PRODUCTS[p])
                .field("categoria", CATEGORIES[p % CATEGORIES.len()])
                .field("cantidad_vendida_producto", i % 7 + 1)
                .field("cantidad_vendida_precio", (i % 97) as f64 * 3.5)
                .field("fecha", format!("2026-{:02}-{:02}T10:00:00Z", i % 12 + 1, i % 28 + 1))
                .build()
        })
        .collect()
}

fn bench_compute_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_view");
    let schema = ViewSchema::sales();
    let config = ViewConfig::new().search("a").sort(SortKey::DateDesc).page(10, 3);

    for size in [100, 1000, 10000].iter() {
        let records = sales(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| compute_view(black_box(records), &config, &schema).total_items);
        });
    }
    group.finish();
}

fn bench_sort_by_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_by_name");
    let schema = ViewSchema::sales();
    let config = ViewConfig::new().sort(SortKey::NameAsc);

    for size in [100, 1000, 10000].iter() {
        let records = sales(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| compute_view(black_box(records), &config, &schema).items.len());
        });
    }
    group.finish();
}

fn bench_top_products(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_products");

    for size in [100, 1000, 10000].iter() {
        let records = sales(*size);
        let all: Vec<&Record> = records.iter().collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &all, |b, all| {
            b.iter(|| stats::top_products_by_quantity(black_box(all), 5));
        });
    }
    group.finish();
}

fn bench_category_resolution(c: &mut Criterion) {
    let categories: Vec<Record> = (1..=200)
        .map(|i| Record::builder().id(i).field("nombre", format!("Categoría {}", i)).build())
        .collect();
    let index = CategoryIndex::from_records(&categories);
    let exact = Record::builder().id(1).field("categoria", "categoría 150").build();
    let partial = Record::builder().id(2).field("categoria", "Categoría 19 y más").build();

    c.bench_function("resolve_exact", |b| b.iter(|| index.resolve(black_box(&exact))));
    c.bench_function("resolve_partial", |b| b.iter(|| index.resolve(black_box(&partial))));
}

criterion_group!(
    benches,
    bench_compute_view,
    bench_sort_by_name,
    bench_top_products,
    bench_category_resolution,
);

criterion_main!(benches);
