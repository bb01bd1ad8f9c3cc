use crate::error::DbError;
use configuration::{DatabaseSettings, SslMode};
use include_dir::{include_dir, Dir};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Connection, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// Schema scripts compiled into the binary. File names sort into apply order.
static MIGRATIONS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/migrations");

/// A single embedded schema-change script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationScript {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Translates the configured settings into driver connect options.
///
/// An explicit `url` wins over the discrete host/port/user fields.
pub fn connect_options(settings: &DatabaseSettings) -> Result<PgConnectOptions, DbError> {
    if let Some(url) = &settings.url {
        return PgConnectOptions::from_str(url).map_err(DbError::Connectivity);
    }

    Ok(PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.name)
        .ssl_mode(ssl_mode(settings.ssl_mode)))
}

fn ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow => PgSslMode::Allow,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

/// Establishes a connection pool to the PostgreSQL database.
///
/// The pool is bounded by `max_connections`; once every connection is checked
/// out, callers queue for up to `acquire_timeout_secs` instead of opening more.
/// A round-trip ping verifies the server before the pool is handed out.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let options = connect_options(settings)?;
    connect_with(options, settings).await
}

/// Like [`connect`], but with caller-built connect options. Pool sizing still
/// comes from `settings`.
pub async fn connect_with(
    options: PgConnectOptions,
    settings: &DatabaseSettings,
) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect_with(options)
        .await
        .map_err(DbError::Connectivity)?;

    if let Err(e) = ping(&pool).await {
        pool.close().await;
        return Err(e);
    }

    tracing::info!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "Database connection established"
    );
    Ok(pool)
}

async fn ping(pool: &PgPool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await.map_err(DbError::Connectivity)?;
    conn.ping().await.map_err(DbError::Connectivity)
}

/// Returns the embedded schema scripts, sorted by file name.
pub fn embedded_migrations() -> Result<Vec<MigrationScript>, DbError> {
    collect_scripts(&MIGRATIONS)
}

fn collect_scripts(dir: &'static Dir<'static>) -> Result<Vec<MigrationScript>, DbError> {
    let mut scripts = dir
        .files()
        .filter(|file| {
            file.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
        })
        .map(|file| {
            let name = file
                .path()
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let sql = file.contents_utf8().ok_or_else(|| DbError::MigrationAsset {
                script: name.to_string(),
            })?;
            Ok(MigrationScript { name, sql })
        })
        .collect::<Result<Vec<_>, DbError>>()?;

    scripts.sort_by(|a, b| a.name.cmp(b.name));
    Ok(scripts)
}

/// Applies every embedded schema script, in name order.
///
/// There is no applied-migrations ledger: each script is written to be
/// idempotent, so this is safe to call on every start. The first failing
/// script aborts the run; scripts before it stay applied.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    let scripts = embedded_migrations()?;
    tracing::info!(count = scripts.len(), "Running database migrations");

    for script in &scripts {
        tracing::debug!(script = script.name, "Applying migration");
        sqlx::raw_sql(script.sql)
            .execute(pool)
            .await
            .map_err(|source| DbError::Migration {
                script: script.name.to_string(),
                source,
            })?;
    }

    tracing::info!("All migrations applied successfully");
    Ok(())
}

/// Releases the pool. Calling it again on a closed pool does nothing.
pub async fn close(pool: &PgPool) {
    if pool.is_closed() {
        return;
    }
    pool.close().await;
    tracing::info!("Database connection pool closed");
}
