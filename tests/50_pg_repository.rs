// Runs against a real database when TEST_DATABASE_URL is set; otherwise
// every test returns early.

use anyhow::Result;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::{ExpiredDeletion, SessionStore};

use htmxtodo::auth::postgres_store;
use htmxtodo::database::{migrations, ListName, ListRepository, PgListRepository};

async fn test_pool() -> Result<Option<PgPool>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return Ok(None);
    };
    let pool = PgPool::connect(&url).await?;
    migrations::run(&pool).await?;
    Ok(Some(pool))
}

fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn create_get_and_list() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = PgListRepository::new(pool);

    let name = unique("Groceries");
    let created = repo.create_list(&ListName::parse(&format!("  {}  ", name))?).await?;
    assert_eq!(created.name, name);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = repo.get_list_by_id(created.id).await?;
    assert_eq!(fetched, created);

    let all = repo.filter_lists().await?;
    assert!(all.iter().any(|l| l.id == created.id));
    Ok(())
}

#[tokio::test]
async fn missing_rows_are_not_found() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = PgListRepository::new(pool);

    let err = repo.get_list_by_id(i64::MAX).await.unwrap_err();
    assert!(err.is_not_found());

    let err = repo
        .update_list_by_id(i64::MAX, &ListName::parse("Anything")?)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn update_changes_name_and_timestamp() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = PgListRepository::new(pool);
    let created = repo.create_list(&ListName::parse(&unique("Before"))?).await?;

    let unchanged = repo
        .update_list_by_id(created.id, &ListName::parse(&created.name)?)
        .await?;
    assert_eq!(unchanged, created);

    let renamed = unique("After");
    let updated = repo
        .update_list_by_id(created.id, &ListName::parse(&renamed)?)
        .await?;
    assert_eq!(updated.name, renamed);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    Ok(())
}

#[tokio::test]
async fn creates_get_distinct_ids() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = PgListRepository::new(pool);
    let name = ListName::parse(&unique("Twin"))?;

    let first = repo.create_list(&name).await?;
    let second = repo.create_list(&name).await?;

    assert_ne!(first.id, second.id);
    assert_eq!(first.name, second.name);
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = PgListRepository::new(pool);
    let created = repo.create_list(&ListName::parse(&unique("Doomed"))?).await?;

    repo.delete_list_by_id(created.id).await?;
    repo.delete_list_by_id(created.id).await?;

    assert!(repo.get_list_by_id(created.id).await.unwrap_err().is_not_found());
    Ok(())
}

fn record(expires_in: Duration) -> Record {
    let mut record = Record {
        id: Id::default(),
        data: Default::default(),
        expiry_date: OffsetDateTime::now_utc() + expires_in,
    };
    record
        .data
        .insert("user".to_string(), serde_json::json!({ "email": "someone@example.com" }));
    record
}

async fn stored_rows(pool: &PgPool, id: &Id) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tower_sessions.session WHERE id = $1")
        .bind(id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[tokio::test]
async fn sessions_round_trip_and_expired_rows_are_deleted() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let store = postgres_store(pool.clone(), true).await?;

    let live = record(Duration::hours(1));
    store.save(&live).await?;
    let loaded = store.load(&live.id).await?.expect("live session");
    assert_eq!(loaded.data, live.data);

    let stale = record(-Duration::hours(1));
    store.save(&stale).await?;
    assert!(store.load(&stale.id).await?.is_none());
    assert_eq!(stored_rows(&pool, &stale.id).await?, 1);

    store.delete_expired().await?;
    assert_eq!(stored_rows(&pool, &stale.id).await?, 0);
    assert_eq!(stored_rows(&pool, &live.id).await?, 1);

    store.delete(&live.id).await?;
    assert!(store.load(&live.id).await?.is_none());
    Ok(())
}
