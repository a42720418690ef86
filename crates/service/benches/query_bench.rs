use criterion::{black_box, criterion_group, criterion_main, Criterion};
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::status::StatusSet;
use models::task;
use rand::rngs::StdRng;
use rand::SeedableRng;
use service::query::{like_pattern, ListParams, Queryable};
use service::{seed, task_service};

fn bench_resolve(c: &mut Criterion) {
    let spec = task::Entity::SPEC;
    c.bench_function("task_query_resolve", |b| {
        b.iter(|| {
            black_box(spec.resolve(black_box(Some("-created_at")), black_box(Some("fin"))));
            black_box(spec.resolve(black_box(Some("not_a_key")), black_box(None)));
        });
    });
    c.bench_function("like_pattern_escape", |b| {
        b.iter(|| black_box(like_pattern(black_box("50%_off! Quarterly REPORT"))));
    });
}

fn bench_list_tasks(c: &mut Criterion) {
    // seed once outside the measured loop
    let rt = tokio::runtime::Runtime::new().unwrap();
    let db = rt.block_on(async {
        let db = connect_with_config(&DatabaseConfig::memory()).await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let opts = seed::SeedOptions { tasks: 200, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(1);
        seed::seed_demo_data(&db, &StatusSet::default(), opts, chrono::Utc::now().fixed_offset(), &mut rng)
            .await
            .unwrap();
        db
    });

    let params = ListParams { q: Some("re".into()), sort_by: Some("priority__name".into()), ..Default::default() };
    c.bench_function("list_tasks_search_sorted", |b| {
        b.iter(|| {
            let _ = rt.block_on(task_service::list_tasks(&db, &params)).unwrap();
        });
    });
}

criterion_group!(benches, bench_resolve, bench_list_tasks);
criterion_main!(benches);
