use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use ph_core::{marker, Error, Result, ID};
use ph_database::{ReportEntry, Store, TableMeta};
use tokio::sync::{Mutex, Notify};

use crate::registry::{Registry, TableHandle};
use crate::sweep::sweep_table;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the table registry and the background tick that guarantees sweep
/// progress even with no inbound events, as an explicit, shutdown-able
/// service rather than process-wide globals.
pub struct SessionService {
    registry: Arc<Registry>,
    ticking: Mutex<HashSet<ID<marker::Table>>>,
    shutdown: Arc<Notify>,
    grace_secs: u64,
}

impl SessionService {
    pub fn new(store: Arc<dyn Store>) -> Arc<Self> {
        Arc::new(Self {
            registry: Arc::new(Registry::new(store)),
            ticking: Mutex::new(HashSet::new()),
            shutdown: Arc::new(Notify::new()),
            grace_secs: ph_core::env::sit_out_grace_secs(),
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub async fn create_table(self: &Arc<Self>, meta: TableMeta) -> Result<Arc<TableHandle>> {
        let id = meta.id;
        let handle = self.registry.create(meta).await?;
        self.ensure_ticking(id).await;
        Ok(handle)
    }

    pub async fn table(self: &Arc<Self>, id: ID<marker::Table>) -> Result<Arc<TableHandle>> {
        let handle = self.registry.table(id).await?;
        self.ensure_ticking(id).await;
        Ok(handle)
    }

    async fn ensure_ticking(self: &Arc<Self>, id: ID<marker::Table>) {
        let mut ticking = self.ticking.lock().await;
        if ticking.insert(id) {
            let service = self.clone();
            tokio::spawn(async move { service.tick_loop(id).await });
        }
    }

    async fn tick_loop(self: Arc<Self>, id: ID<marker::Table>) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.shutdown.notified() => break,
            }
            if !self.registry.ids().await.contains(&id) {
                break;
            }
            let now = now_unix();
            let handle = match self.registry.table(id).await {
                Ok(handle) => handle,
                Err(_) => break,
            };
            if let Err(e) = sweep_table(id, &handle, &self.registry, now, self.grace_secs).await {
                log::warn!("[session] sweep of table {id} failed: {e}");
            }
        }
        self.ticking.lock().await.remove(&id);
    }

    /// Closes out a table for good: cashes out every currently seated
    /// player against their live stack, writes one report row per seat,
    /// then marks the table metadata closed and drops the live engine
    /// from the registry. Report rows are written before the engine is
    /// dropped so a crash mid-close never loses a seat's cash-out.
    pub async fn close_table(&self, id: ID<marker::Table>, club: ID<marker::Club>) -> Result<()> {
        let handle = self.registry.table(id).await?;
        let now = now_unix();
        let entries = {
            let table = handle.engine.lock().await;
            let mut entries = Vec::new();
            for player in table.players() {
                let Some(user_id) = player.user_id else { continue };
                let store = self.registry.store();
                let session = store
                    .close_session(id, user_id, player.stack)
                    .await
                    .map_err(|e| Error::illegal(e.to_string()))?;
                store
                    .adjust_wallet(user_id, player.stack)
                    .await
                    .map_err(|e| Error::illegal(e.to_string()))?;
                entries.push(ReportEntry {
                    user: user_id,
                    buy_in: session.buy_in,
                    cash_out: player.stack,
                    profit_loss: player.stack - session.buy_in,
                });
            }
            entries
        };
        let store = self.registry.store();
        if !entries.is_empty() {
            let report = store
                .create_report(id, club, now)
                .await
                .map_err(|e| Error::illegal(e.to_string()))?;
            store
                .append_entries(report, &entries)
                .await
                .map_err(|e| Error::illegal(e.to_string()))?;
        }
        self.registry.close(id).await
    }

    /// Closes every channel and flushes every stack before returning.
    /// Ticks are cancelled first so no sweep races the final flush.
    pub async fn shutdown(&self) {
        self.shutdown.notify_waiters();
        let now = now_unix();
        for id in self.registry.ids().await {
            if let Ok(handle) = self.registry.table(id).await {
                let table = handle.engine.lock().await;
                let _ = self.registry.persist_stacks(id, &table, now).await;
            }
        }
    }
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
