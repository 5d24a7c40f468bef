use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ph_core::{marker, Chips, Error, Result, ID};
use ph_database::{Store, TableMeta, TableStack, TableStatus};
use ph_engine::{Table, TableConfig};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, RwLock};

use crate::chat::ChatLog;
use crate::view::{masked_view, Frame};

pub type ChannelId = u64;

#[derive(Debug)]
struct Subscriber {
    user_id: Option<ID<marker::User>>,
    tx: UnboundedSender<Frame>,
}

/// Process-wide count of distinct authenticated users with at least one
/// open channel, across every table.
#[derive(Debug, Default)]
pub struct Presence {
    counts: std::sync::Mutex<HashMap<ID<marker::User>, u32>>,
}

impl Presence {
    fn mark(&self, user: ID<marker::User>) {
        *self.counts.lock().unwrap().entry(user).or_insert(0) += 1;
    }

    fn unmark(&self, user: ID<marker::User>) {
        let mut counts = self.counts.lock().unwrap();
        if let Some(count) = counts.get_mut(&user) {
            *count -= 1;
            if *count == 0 {
                counts.remove(&user);
            }
        }
    }

    fn count_with(&self, user: ID<marker::User>) -> usize {
        let counts = self.counts.lock().unwrap();
        if counts.contains_key(&user) {
            counts.len()
        } else {
            counts.len() + 1
        }
    }
}

/// Everything a live table needs beyond the pure state machine: chat
/// backlog and the set of channels currently watching it. Engine mutation,
/// broadcast, and persistence all run under `engine`'s lock so every
/// subscriber sees a consistent, serialized sequence of states.
#[derive(Debug)]
pub struct TableHandle {
    pub engine: Mutex<Table>,
    pub name: String,
    chat: std::sync::Mutex<ChatLog>,
    subscribers: std::sync::Mutex<HashMap<ChannelId, Subscriber>>,
    next_channel_id: AtomicU64,
    /// Per-user stack at the start of the current hand, used to compute
    /// hand-history net-change once the hand finalizes. Empty between
    /// hands.
    pub(crate) hand_start_stacks: std::sync::Mutex<HashMap<ID<marker::User>, Chips>>,
    presence: Arc<Presence>,
}

impl TableHandle {
    fn new(table: Table, name: String, presence: Arc<Presence>) -> Self {
        Self {
            engine: Mutex::new(table),
            name,
            chat: std::sync::Mutex::new(ChatLog::default()),
            subscribers: std::sync::Mutex::new(HashMap::new()),
            next_channel_id: AtomicU64::new(0),
            hand_start_stacks: std::sync::Mutex::new(HashMap::new()),
            presence,
        }
    }

    /// Registers a new channel, sends it the connect-time chat backlog,
    /// and returns its id plus the receiving half.
    pub fn subscribe(&self, user_id: Option<ID<marker::User>>) -> (ChannelId, UnboundedReceiver<Frame>) {
        let (tx, rx) = unbounded_channel();
        let history = self.chat.lock().unwrap().backlog();
        let _ = tx.send(Frame::ChatHistory(history));
        let id = self.next_channel_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().unwrap().insert(id, Subscriber { user_id, tx });
        if let Some(user_id) = user_id {
            self.presence.mark(user_id);
        }
        (id, rx)
    }

    /// Idempotent: removing an already-removed channel is a no-op.
    pub fn unsubscribe(&self, channel: ChannelId) {
        let removed = self.subscribers.lock().unwrap().remove(&channel);
        if let Some(Subscriber { user_id: Some(user_id), .. }) = removed {
            self.presence.unmark(user_id);
        }
    }

    pub fn post_chat(&self, user_id: ID<marker::User>, username: String, message: &str, now: i64) -> Result<()> {
        let entry = self.chat.lock().unwrap().push(user_id, username, message, now)?;
        self.dispatch(Frame::ChatMessage(entry));
        Ok(())
    }

    /// Sends an unmasked frame to every current subscriber, for frames
    /// (chat) that carry nothing viewer-specific.
    fn dispatch(&self, frame: Frame) {
        let subscribers = self.subscribers.lock().unwrap();
        for sub in subscribers.values() {
            let _ = sub.tx.send(frame.clone());
        }
    }

    /// Computes a masked `TableState` per subscriber and dispatches it.
    /// Caller must hold `engine`'s lock so the frame reflects a consistent
    /// snapshot.
    pub fn broadcast(&self, table: &Table) {
        let subscribers = self.subscribers.lock().unwrap();
        for sub in subscribers.values() {
            let view = masked_view(table, sub.user_id);
            let _ = sub.tx.send(Frame::TableState(view));
        }
    }

    /// Best-effort send to every channel a user-id is associated with;
    /// used by the edge layer when it needs to fan a message directly to
    /// one seated player rather than every viewer.
    pub fn unicast(&self, user_id: ID<marker::User>, frame: Frame) {
        let subscribers = self.subscribers.lock().unwrap();
        for sub in subscribers.values().filter(|s| s.user_id == Some(user_id)) {
            let _ = sub.tx.send(frame.clone());
        }
    }
}

/// Registry of live tables keyed by id, with on-demand hydration from
/// persistence.
pub struct Registry {
    tables: RwLock<HashMap<ID<marker::Table>, Arc<TableHandle>>>,
    store: Arc<dyn Store>,
    presence: Arc<Presence>,
}

impl Registry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            store,
            presence: Arc::new(Presence::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Unique users with at least one open channel anywhere, plus the
    /// requesting user even if they have none open yet.
    pub fn online_count(&self, requesting_user: ID<marker::User>) -> usize {
        self.presence.count_with(requesting_user)
    }

    /// Returns the handle for `id`, hydrating it from persistence on
    /// first access. Fails if the table has no metadata row.
    pub async fn table(&self, id: ID<marker::Table>) -> Result<Arc<TableHandle>> {
        if let Some(handle) = self.tables.read().await.get(&id) {
            return Ok(handle.clone());
        }
        let mut tables = self.tables.write().await;
        if let Some(handle) = tables.get(&id) {
            return Ok(handle.clone());
        }
        let handle = Arc::new(self.hydrate(id).await?);
        tables.insert(id, handle.clone());
        Ok(handle)
    }

    async fn hydrate(&self, id: ID<marker::Table>) -> Result<TableHandle> {
        let meta = self
            .store
            .load_table_meta(id)
            .await
            .map_err(|e| Error::illegal(e.to_string()))?
            .ok_or_else(|| Error::not_found("table"))?;
        let config = TableConfig {
            game_kind: meta.game_kind,
            small_blind: meta.small_blind,
            big_blind: meta.big_blind,
            max_seats: meta.max_seats,
            bomb_pot_every_n_hands: meta.bomb_pot_every_n_hands,
            bomb_pot_amount: meta.bomb_pot_amount,
            ..TableConfig::default()
        };
        let mut table = Table::new(id, config);
        let stacks = self
            .store
            .list_stacks(id)
            .await
            .map_err(|e| Error::illegal(e.to_string()))?;
        for stack in stacks {
            table.add_player(stack.name, stack.stack, Some(stack.user), stack.avatar, Some(stack.seat))?;
        }
        Ok(TableHandle::new(table, meta.name.unwrap_or_else(|| id.to_string()), self.presence.clone()))
    }

    /// Creates table metadata and registers an empty, running handle for
    /// it so the first `sit` doesn't race a second hydration.
    pub async fn create(&self, meta: TableMeta) -> Result<Arc<TableHandle>> {
        self.store
            .create_table_meta(&meta)
            .await
            .map_err(|e| Error::illegal(e.to_string()))?;
        let config = TableConfig {
            game_kind: meta.game_kind,
            small_blind: meta.small_blind,
            big_blind: meta.big_blind,
            max_seats: meta.max_seats,
            bomb_pot_every_n_hands: meta.bomb_pot_every_n_hands,
            bomb_pot_amount: meta.bomb_pot_amount,
            ..TableConfig::default()
        };
        let name = meta.name.clone().unwrap_or_else(|| meta.id.to_string());
        let handle = Arc::new(TableHandle::new(Table::new(meta.id, config), name, self.presence.clone()));
        self.tables.write().await.insert(meta.id, handle.clone());
        Ok(handle)
    }

    /// Marks a table closed and drops it from the registry; channels stay
    /// open until their sender drops, so subscribers observe a clean end
    /// of stream rather than a broken send.
    pub async fn close(&self, id: ID<marker::Table>) -> Result<()> {
        self.store
            .update_table_status(id, TableStatus::Closed)
            .await
            .map_err(|e| Error::illegal(e.to_string()))?;
        self.tables.write().await.remove(&id);
        Ok(())
    }

    pub async fn ids(&self) -> Vec<ID<marker::Table>> {
        self.tables.read().await.keys().copied().collect()
    }

    /// Persists every seated player's current stack; called after every
    /// broadcast so a crash never loses more than the in-flight mutation.
    pub async fn persist_stacks(&self, id: ID<marker::Table>, table: &Table, now: i64) -> Result<()> {
        for player in table.players() {
            if let Some(user_id) = player.user_id {
                self.store
                    .upsert_stack(&TableStack {
                        table: id,
                        user: user_id,
                        seat: player.seat,
                        stack: player.stack,
                        name: player.name.clone(),
                        avatar: player.avatar.clone(),
                        updated_at: now,
                    })
                    .await
                    .map_err(|e| Error::illegal(e.to_string()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ph_database::MemStore;

    fn sample_meta(id: ID<marker::Table>) -> TableMeta {
        TableMeta {
            id,
            club: ID::default(),
            creator: ID::default(),
            name: Some("table".into()),
            max_seats: 6,
            small_blind: 1,
            big_blind: 2,
            game_kind: ph_cards::GameKind::Holdem,
            bomb_pot_every_n_hands: None,
            bomb_pot_amount: 0,
            status: TableStatus::Active,
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn hydrate_fails_for_unknown_table() {
        let registry = Registry::new(Arc::new(MemStore::new()));
        let err = registry.table(ID::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn create_then_fetch_returns_same_handle() {
        let registry = Registry::new(Arc::new(MemStore::new()));
        let id = ID::default();
        registry.create(sample_meta(id)).await.unwrap();
        let handle = registry.table(id).await.unwrap();
        assert_eq!(handle.engine.lock().await.id, id);
    }
}
