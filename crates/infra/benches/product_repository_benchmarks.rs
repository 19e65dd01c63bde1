use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use rust_decimal::Decimal;
use stockroom_infra::InMemoryProductRepository;
use stockroom_products::{NewProduct, ProductQuery, ProductRepository, ProductService};
use tokio::runtime::Runtime;

fn seeded_service(rt: &Runtime, size: usize) -> ProductService<InMemoryProductRepository> {
    let service = ProductService::new(InMemoryProductRepository::new());
    rt.block_on(async {
        for i in 0..size {
            let name = if i % 3 == 0 {
                format!("Laptop {i}")
            } else {
                format!("Mouse {i}")
            };
            service
                .create(NewProduct {
                    name,
                    sku: format!("SKU-{i:06}"),
                    price: Decimal::new(1999, 2),
                    quantity: Some(1),
                })
                .await
                .unwrap();
        }
    });
    service
}

/// Benchmark: paginated search over tables of increasing size.
fn bench_find_page(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("find_page");

    for size in [100usize, 1_000, 10_000] {
        let service = seeded_service(&rt, size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("search", size), &size, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    let page = service
                        .find_page(ProductQuery {
                            search: Some("laptop".to_string()),
                            page: Some(2),
                            limit: Some(20),
                        })
                        .await
                        .unwrap();
                    black_box(page)
                })
            })
        });

        group.bench_with_input(BenchmarkId::new("unfiltered", size), &size, |b, _| {
            b.iter(|| {
                rt.block_on(async { black_box(service.find_page(ProductQuery::default()).await.unwrap()) })
            })
        });
    }

    group.finish();
}

/// Benchmark: SKU uniqueness lookup (the hot path of every create).
fn bench_find_by_sku(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let service = seeded_service(&rt, 10_000);

    c.bench_function("find_by_sku/10000", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(service.repository().find_by_sku("SKU-009999").await.unwrap())
            })
        })
    });
}

criterion_group!(benches, bench_find_page, bench_find_by_sku);
criterion_main!(benches);
