//! # Telemonitor Database Crate
//!
//! This crate is the persistence layer of the message-monitoring service. It
//! records which channels are watched and how far ingestion has progressed,
//! keeps a deduplicated ledger of ingested messages, and stores alert
//! triggers, daily reports and transport session blobs in PostgreSQL.
//!
//! ## Invariants
//!
//! - **At most once per natural key:** channel creation and message appends
//!   ignore conflicts, so ingestion can be retried or replayed freely.
//! - **One report per channel per day:** report writes replace on conflict,
//!   keyed by the UTC calendar day.
//! - **Explicit pool:** the `PgPool` returned by `connect` is passed to every
//!   store; there is no hidden global connection.
//!
//! ## Public API
//!
//! - `connect` / `connect_with`: open the bounded pool and ping the server.
//! - `run_migrations`: apply the embedded, idempotent schema scripts in name order.
//! - `close`: release the pool.
//! - `DbRepository` and the individual stores (`ChannelStore`, `MessageLedger`,
//!   `TriggerStore`, `ReportStore`, `SessionStore`).
//! - `DbError`: the error type returned by every operation.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{
    close, connect, connect_options, connect_with, embedded_migrations, run_migrations,
    MigrationScript,
};
pub use error::DbError;
pub use repository::{
    ChannelStore, DbRepository, MessageLedger, ReportStore, SessionStore, TriggerStore,
};
