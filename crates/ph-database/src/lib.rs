//! Persistence adapter for table metadata, stacks, the session ledger,
//! closing reports, hand history, and wallet balances.
//!
//! Implementation-agnostic at the API boundary ([`Store`]); two
//! implementations are provided here, a `tokio-postgres`-backed
//! [`PgStore`] for production and an in-memory [`MemStore`] for tests.

mod memory;
mod model;
mod postgres;
mod schema;
mod store;

pub use memory::MemStore;
pub use model::{
    HandHistoryEntry, HandResult, ReportEntry, TableMeta, TableSession, TableStack, TableStatus,
};
pub use postgres::PgStore;
pub use schema::Schema;
pub use store::Store;
