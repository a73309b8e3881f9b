//! Postgres repository tests.
//!
//! - Need a reachable Postgres via `DATABASE_URL`; `sqlx::test` creates a scratch database per test.
//! - Marked `#[ignore]` so they only run with `cargo test -- --ignored`.

use std::sync::Arc;

use sqlx::PgPool;

use docservice::application::documents::{DocumentService, LookupSource};
use docservice::application::repos::{DocumentsRepo, RepoError};
use docservice::cache::{CacheConfig, MemoryDocumentCache};
use docservice::domain::entities::{Document, Entry, Group};
use docservice::infra::db::PostgresRepositories;

fn sample(title: &str) -> Document {
    Document {
        id: 0,
        title: title.to_string(),
        internal_note: "ops only".to_string(),
        groups: vec![
            Group {
                sort: 1,
                name: "b".into(),
                internal_note: "g".into(),
                entries: vec![Entry {
                    key: "k".into(),
                    value: "v".into(),
                    internal_note: "e".into(),
                }],
            },
            Group {
                sort: 5,
                name: "a".into(),
                internal_note: String::new(),
                entries: Vec::new(),
            },
        ],
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn insert_and_find_round_trip_internal_fields(pool: PgPool) {
    let repo = PostgresRepositories::new(pool);

    let created = repo
        .insert_document(&sample("stored"))
        .await
        .expect("insert");
    assert!(created.id > 0);

    let found = repo
        .find_document(created.id)
        .await
        .expect("find")
        .expect("present");
    assert_eq!(found, created);
    assert_eq!(found.internal_note, "ops only");
    assert_eq!(found.groups[0].entries[0].internal_note, "e");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn missing_rows_are_reported(pool: PgPool) {
    let repo = PostgresRepositories::new(pool);

    assert!(repo.find_document(404).await.expect("find").is_none());

    let mut ghost = sample("ghost");
    ghost.id = 404;
    assert!(matches!(
        repo.update_document(&ghost).await,
        Err(RepoError::NotFound)
    ));
    assert!(matches!(
        repo.delete_document(404).await,
        Err(RepoError::NotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn list_orders_by_id_and_counts_everything(pool: PgPool) {
    let repo = PostgresRepositories::new(pool);
    for n in 0..4 {
        repo.insert_document(&sample(&format!("doc-{n}")))
            .await
            .expect("insert");
    }

    let page = repo.list_documents(2, 1).await.expect("list");

    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 2);
    assert!(page.items[0].id < page.items[1].id);
    assert_eq!(page.items[0].title, "doc-1");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn service_over_postgres_keeps_cache_consistent(pool: PgPool) {
    let repo = Arc::new(PostgresRepositories::new(pool));
    let cache = Arc::new(MemoryDocumentCache::new(&CacheConfig::default()));
    let service = DocumentService::new(repo, cache);

    let created = service.create(sample("v1")).await.expect("create");
    assert_eq!(created.groups[0].name, "a");

    let cold = service.get_projection(created.id).await.expect("cold");
    let warm = service.get_projection(created.id).await.expect("warm");
    assert_eq!(cold.source, LookupSource::Store);
    assert_eq!(warm.source, LookupSource::Cache);

    let mut changed = created.clone();
    changed.title = "v2".into();
    service.update(changed).await.expect("update");

    let fresh = service.get_projection(created.id).await.expect("fresh");
    assert_eq!(fresh.projection.title, "v2");
    assert_eq!(fresh.source, LookupSource::Store);
}
