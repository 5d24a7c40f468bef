use std::collections::HashMap;
use std::sync::Mutex;

use ph_core::{marker, Chips, ID};

use crate::model::{HandHistoryEntry, ReportEntry, TableMeta, TableSession, TableStack, TableStatus};
use crate::store::Store;

/// In-memory [`Store`] for tests: no network, no schema, process-lifetime
/// only. A `Mutex`-guarded map per table, matching the lock-per-resource
/// shape `ph-session` uses for live tables.
#[derive(Default)]
pub struct MemStore {
    tables: Mutex<HashMap<ID<marker::Table>, TableMeta>>,
    stacks: Mutex<HashMap<(ID<marker::Table>, ID<marker::User>), TableStack>>,
    sessions: Mutex<HashMap<ID<marker::Session>, TableSession>>,
    entries: Mutex<HashMap<ID<marker::Report>, Vec<ReportEntry>>>,
    history: Mutex<Vec<HandHistoryEntry>>,
    wallets: Mutex<HashMap<ID<marker::User>, Chips>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: seed a wallet balance directly.
    pub fn seed_wallet(&self, user: ID<marker::User>, balance: Chips) {
        self.wallets.lock().unwrap().insert(user, balance);
    }

    /// Test helper: read back appended hand-history rows in order.
    pub fn history(&self) -> Vec<HandHistoryEntry> {
        self.history.lock().unwrap().clone()
    }
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[async_trait::async_trait]
impl Store for MemStore {
    async fn create_table_meta(&self, meta: &TableMeta) -> anyhow::Result<()> {
        self.tables.lock().unwrap().insert(meta.id, meta.clone());
        Ok(())
    }

    async fn load_table_meta(&self, id: ID<marker::Table>) -> anyhow::Result<Option<TableMeta>> {
        Ok(self.tables.lock().unwrap().get(&id).cloned())
    }

    async fn update_table_status(
        &self,
        id: ID<marker::Table>,
        status: TableStatus,
    ) -> anyhow::Result<()> {
        if let Some(meta) = self.tables.lock().unwrap().get_mut(&id) {
            meta.status = status;
        }
        Ok(())
    }

    async fn list_stacks(&self, table: ID<marker::Table>) -> anyhow::Result<Vec<TableStack>> {
        let mut out: Vec<TableStack> = self
            .stacks
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.table == table)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.seat);
        Ok(out)
    }

    async fn upsert_stack(&self, stack: &TableStack) -> anyhow::Result<()> {
        self.stacks
            .lock()
            .unwrap()
            .insert((stack.table, stack.user), stack.clone());
        Ok(())
    }

    async fn delete_stack(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
    ) -> anyhow::Result<()> {
        self.stacks.lock().unwrap().remove(&(table, user));
        Ok(())
    }

    async fn open_session(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
        buy_in: Chips,
    ) -> anyhow::Result<TableSession> {
        let session = TableSession {
            id: ID::default(),
            table,
            user,
            buy_in,
            cash_out: None,
            profit_loss: None,
            opened_at: now_unix(),
            closed_at: None,
        };
        self.sessions.lock().unwrap().insert(session.id, session.clone());
        Ok(session)
    }

    async fn close_session(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
        cash_out: Chips,
    ) -> anyhow::Result<TableSession> {
        let mut sessions = self.sessions.lock().unwrap();
        let open = sessions
            .values_mut()
            .find(|s| s.table == table && s.user == user && s.closed_at.is_none())
            .ok_or_else(|| anyhow::anyhow!("no open session for table {table} user {user}"))?;
        open.cash_out = Some(cash_out);
        open.profit_loss = Some(cash_out - open.buy_in);
        open.closed_at = Some(now_unix());
        Ok(open.clone())
    }

    async fn find_open_session(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
    ) -> anyhow::Result<Option<TableSession>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .find(|s| s.table == table && s.user == user && s.closed_at.is_none())
            .cloned())
    }

    async fn create_report(
        &self,
        _table: ID<marker::Table>,
        _club: ID<marker::Club>,
        _closed_at: i64,
    ) -> anyhow::Result<ID<marker::Report>> {
        let id = ID::default();
        self.entries.lock().unwrap().insert(id, Vec::new());
        Ok(id)
    }

    async fn append_entries(
        &self,
        report: ID<marker::Report>,
        rows: &[ReportEntry],
    ) -> anyhow::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .entry(report)
            .or_default()
            .extend_from_slice(rows);
        Ok(())
    }

    async fn append_hand_history(&self, entry: &HandHistoryEntry) -> anyhow::Result<()> {
        self.history.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn read_wallet(&self, user: ID<marker::User>) -> anyhow::Result<Chips> {
        Ok(*self.wallets.lock().unwrap().get(&user).unwrap_or(&0))
    }

    async fn adjust_wallet(&self, user: ID<marker::User>, delta: Chips) -> anyhow::Result<Chips> {
        let mut wallets = self.wallets.lock().unwrap();
        let balance = wallets.entry(user).or_insert(0);
        *balance += delta;
        Ok(*balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn at_most_one_open_session_per_table_and_user() {
        let store = MemStore::new();
        let table = ID::default();
        let user = ID::default();
        store.open_session(table, user, 100).await.unwrap();
        assert!(store.find_open_session(table, user).await.unwrap().is_some());
        store.close_session(table, user, 140).await.unwrap();
        assert!(store.find_open_session(table, user).await.unwrap().is_none());

        let second = store.open_session(table, user, 50).await.unwrap();
        assert!(store.find_open_session(table, user).await.unwrap().is_some());
        assert_eq!(second.buy_in, 50);
    }

    #[tokio::test]
    async fn wallet_adjustments_accumulate() {
        let store = MemStore::new();
        let user = ID::default();
        store.seed_wallet(user, 1_000);
        let balance = store.adjust_wallet(user, -400).await.unwrap();
        assert_eq!(balance, 600);
        assert_eq!(store.read_wallet(user).await.unwrap(), 600);
    }
}
