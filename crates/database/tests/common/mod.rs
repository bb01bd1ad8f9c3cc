//! Shared setup for database integration tests.
//!
//! Tests run against the server named by `TEST_DATABASE_URL` (or
//! `DATABASE_URL`). Without either, `setup` returns `None` and the calling test
//! returns early; under `CI` that is a panic instead. Each test gets a private
//! schema so tests never see each other's rows, and the schema is dropped
//! again by `teardown`.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use configuration::DatabaseSettings;
use database::DbRepository;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;

pub struct TestDb {
    pub pool: PgPool,
    pub repo: DbRepository,
    admin: PgPool,
    schema: String,
}

/// Picks the server to test against. Outside CI a missing URL skips the
/// database tests; with `CI` set it is a hard failure so a green run always
/// means the stores were exercised.
pub fn database_url(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let url = lookup("TEST_DATABASE_URL").or_else(|| lookup("DATABASE_URL"));
    if url.is_none() && lookup("CI").is_some_and(|v| !v.is_empty() && v != "false") {
        panic!("CI is set but neither TEST_DATABASE_URL nor DATABASE_URL is");
    }
    url
}

pub async fn setup() -> Option<TestDb> {
    let Some(url) = database_url(|var| std::env::var(var).ok()) else {
        eprintln!("skipping: set TEST_DATABASE_URL to run database tests");
        return None;
    };

    let base = PgConnectOptions::from_str(&url).unwrap();
    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(base.clone())
        .await
        .unwrap();

    let schema = format!("telemonitor_test_{}", uuid::Uuid::new_v4().simple());
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .unwrap();

    let settings = DatabaseSettings {
        max_connections: 4,
        min_connections: 0,
        ..DatabaseSettings::default()
    };
    let options = base.options([("search_path", schema.as_str())]);
    let pool = database::connect_with(options, &settings).await.unwrap();
    database::run_migrations(&pool).await.unwrap();

    Some(TestDb {
        repo: DbRepository::new(pool.clone()),
        pool,
        admin,
        schema,
    })
}

impl TestDb {
    pub async fn teardown(self) {
        database::close(&self.pool).await;
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .unwrap();
        self.admin.close().await;
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}
