use ph_core::{marker, Chips, ID};

use crate::model::{HandHistoryEntry, ReportEntry, TableMeta, TableSession, TableStack, TableStatus};

/// Durable storage for everything the table engine and session layer
/// need across restarts: table metadata, per-seat stacks, the session
/// ledger, closing reports, hand history, and wallet balances.
///
/// Implementation-agnostic by design: callers depend on this trait,
/// never on `tokio_postgres` directly, so any store with serializable
/// single-row transactions satisfies it.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn create_table_meta(&self, meta: &TableMeta) -> anyhow::Result<()>;
    async fn load_table_meta(&self, id: ID<marker::Table>) -> anyhow::Result<Option<TableMeta>>;
    async fn update_table_status(
        &self,
        id: ID<marker::Table>,
        status: TableStatus,
    ) -> anyhow::Result<()>;

    async fn list_stacks(&self, table: ID<marker::Table>) -> anyhow::Result<Vec<TableStack>>;
    async fn upsert_stack(&self, stack: &TableStack) -> anyhow::Result<()>;
    async fn delete_stack(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
    ) -> anyhow::Result<()>;

    async fn open_session(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
        buy_in: Chips,
    ) -> anyhow::Result<TableSession>;
    async fn close_session(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
        cash_out: Chips,
    ) -> anyhow::Result<TableSession>;
    async fn find_open_session(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
    ) -> anyhow::Result<Option<TableSession>>;

    async fn create_report(
        &self,
        table: ID<marker::Table>,
        club: ID<marker::Club>,
        closed_at: i64,
    ) -> anyhow::Result<ID<marker::Report>>;
    async fn append_entries(
        &self,
        report: ID<marker::Report>,
        rows: &[ReportEntry],
    ) -> anyhow::Result<()>;

    async fn append_hand_history(&self, entry: &HandHistoryEntry) -> anyhow::Result<()>;

    async fn read_wallet(&self, user: ID<marker::User>) -> anyhow::Result<Chips>;
    async fn adjust_wallet(&self, user: ID<marker::User>, delta: Chips) -> anyhow::Result<Chips>;
}
