//! The five stores that make up the persistence layer.
//!
//! Every store holds a clone of the same pool and never calls another store.

pub mod channels;
pub mod messages;
pub mod reports;
pub mod sessions;
pub mod triggers;

pub use channels::ChannelStore;
pub use messages::MessageLedger;
pub use reports::ReportStore;
pub use sessions::SessionStore;
pub use triggers::TriggerStore;

use sqlx::PgPool;

/// The `DbRepository` bundles every store over one shared connection pool.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pub channels: ChannelStore,
    pub messages: MessageLedger,
    pub triggers: TriggerStore,
    pub reports: ReportStore,
    pub sessions: SessionStore,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            channels: ChannelStore::new(pool.clone()),
            messages: MessageLedger::new(pool.clone()),
            triggers: TriggerStore::new(pool.clone()),
            reports: ReportStore::new(pool.clone()),
            sessions: SessionStore::new(pool),
        }
    }
}
