use std::sync::Arc;

use ph_cards::GameKind;
use ph_core::{marker, Chips, Seat, ID};
use tokio_postgres::Client;

use crate::model::{
    HandHistoryEntry, ReportEntry, TableMeta, TableSession, TableStack, TableStatus,
};
use crate::schema;
use crate::store::Store;

fn game_kind_str(kind: GameKind) -> &'static str {
    match kind {
        GameKind::Holdem => "holdem",
        GameKind::Omaha => "omaha",
    }
}

fn game_kind_parse(s: &str) -> GameKind {
    match s {
        "omaha" => GameKind::Omaha,
        _ => GameKind::Holdem,
    }
}

/// `tokio-postgres`-backed [`Store`]. Holds a shared client behind a
/// named type so `Store` stays implementable by something other than a
/// raw client (see [`crate::memory::MemStore`]).
pub struct PgStore {
    client: Arc<Client>,
}

impl PgStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// The shared client backing this store, for collaborators (the
    /// membership gate) that need to issue their own queries against the
    /// same connection rather than open a second one.
    pub fn client(&self) -> Arc<Client> {
        self.client.clone()
    }

    /// Connects using `DB_URL` and runs bootstrap DDL for every table.
    ///
    /// # Panics
    /// Panics if `DB_URL` is unset or the connection fails, matching the
    /// startup-time fail-fast behavior of the crate this was grounded on.
    pub async fn connect() -> anyhow::Result<Self> {
        log::info!("connecting to database");
        let url = ph_core::env::db_url();
        let (client, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("database connection closed: {e}");
            }
        });
        let store = Self::new(Arc::new(client));
        store.bootstrap().await?;
        Ok(store)
    }

    async fn bootstrap(&self) -> anyhow::Result<()> {
        for (creates, indices) in schema::BOOTSTRAP {
            self.client.batch_execute(creates()).await?;
            let idx = indices();
            if !idx.is_empty() {
                self.client.batch_execute(idx).await?;
            }
        }
        Ok(())
    }
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn session_from_row(row: &tokio_postgres::Row) -> TableSession {
    TableSession {
        id: ID::from(row.get::<_, uuid::Uuid>(0)),
        table: ID::from(row.get::<_, uuid::Uuid>(1)),
        user: ID::from(row.get::<_, uuid::Uuid>(2)),
        buy_in: row.get::<_, Chips>(3),
        cash_out: row.get::<_, Option<Chips>>(4),
        profit_loss: row.get::<_, Option<Chips>>(5),
        opened_at: row.get::<_, Chips>(6),
        closed_at: row.get::<_, Option<Chips>>(7),
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn create_table_meta(&self, meta: &TableMeta) -> anyhow::Result<()> {
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    schema::TABLES,
                    " (id, club_id, creator_id, name, max_seats, small_blind, big_blind,
                       game_kind, bomb_pot_every_n_hands, bomb_pot_amount, status, created_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
                ),
                &[
                    &meta.id.inner(),
                    &meta.club.inner(),
                    &meta.creator.inner(),
                    &meta.name,
                    &(meta.max_seats as i16),
                    &meta.small_blind,
                    &meta.big_blind,
                    &game_kind_str(meta.game_kind),
                    &meta.bomb_pot_every_n_hands.map(|n| n as i64),
                    &meta.bomb_pot_amount,
                    &meta.status.as_str(),
                    &meta.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn load_table_meta(&self, id: ID<marker::Table>) -> anyhow::Result<Option<TableMeta>> {
        let row = self
            .client
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, club_id, creator_id, name, max_seats, small_blind, big_blind,
                            game_kind, bomb_pot_every_n_hands, bomb_pot_amount, status, created_at
                     FROM ",
                    schema::TABLES,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await?;
        Ok(row.map(|row| TableMeta {
            id: ID::from(row.get::<_, uuid::Uuid>(0)),
            club: ID::from(row.get::<_, uuid::Uuid>(1)),
            creator: ID::from(row.get::<_, uuid::Uuid>(2)),
            name: row.get(3),
            max_seats: row.get::<_, i16>(4) as Seat,
            small_blind: row.get::<_, Chips>(5),
            big_blind: row.get::<_, Chips>(6),
            game_kind: game_kind_parse(row.get::<_, &str>(7)),
            bomb_pot_every_n_hands: row.get::<_, Option<i64>>(8).map(|n| n as u64),
            bomb_pot_amount: row.get::<_, Chips>(9),
            status: TableStatus::parse(row.get::<_, &str>(10)),
            created_at: row.get::<_, Chips>(11),
        }))
    }

    async fn update_table_status(
        &self,
        id: ID<marker::Table>,
        status: TableStatus,
    ) -> anyhow::Result<()> {
        self.client
            .execute(
                const_format::concatcp!(
                    "UPDATE ",
                    schema::TABLES,
                    " SET status = $2 WHERE id = $1"
                ),
                &[&id.inner(), &status.as_str()],
            )
            .await?;
        Ok(())
    }

    async fn list_stacks(&self, table: ID<marker::Table>) -> anyhow::Result<Vec<TableStack>> {
        let rows = self
            .client
            .query(
                const_format::concatcp!(
                    "SELECT table_id, user_id, seat, stack, name, avatar, updated_at FROM ",
                    schema::STACKS,
                    " WHERE table_id = $1 ORDER BY seat"
                ),
                &[&table.inner()],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| TableStack {
                table: ID::from(row.get::<_, uuid::Uuid>(0)),
                user: ID::from(row.get::<_, uuid::Uuid>(1)),
                seat: row.get::<_, i16>(2) as Seat,
                stack: row.get::<_, Chips>(3),
                name: row.get(4),
                avatar: row.get(5),
                updated_at: row.get::<_, Chips>(6),
            })
            .collect())
    }

    async fn upsert_stack(&self, stack: &TableStack) -> anyhow::Result<()> {
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    schema::STACKS,
                    " (table_id, user_id, seat, stack, name, avatar, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)
                     ON CONFLICT (table_id, user_id) DO UPDATE SET
                        seat = EXCLUDED.seat,
                        stack = EXCLUDED.stack,
                        name = EXCLUDED.name,
                        avatar = EXCLUDED.avatar,
                        updated_at = EXCLUDED.updated_at"
                ),
                &[
                    &stack.table.inner(),
                    &stack.user.inner(),
                    &(stack.seat as i16),
                    &stack.stack,
                    &stack.name,
                    &stack.avatar,
                    &stack.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn delete_stack(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
    ) -> anyhow::Result<()> {
        self.client
            .execute(
                const_format::concatcp!(
                    "DELETE FROM ",
                    schema::STACKS,
                    " WHERE table_id = $1 AND user_id = $2"
                ),
                &[&table.inner(), &user.inner()],
            )
            .await?;
        Ok(())
    }

    async fn open_session(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
        buy_in: Chips,
    ) -> anyhow::Result<TableSession> {
        let id = ID::<marker::Session>::default();
        let opened_at = now_unix();
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    schema::SESSIONS,
                    " (id, table_id, user_id, buy_in, opened_at) VALUES ($1, $2, $3, $4, $5)"
                ),
                &[&id.inner(), &table.inner(), &user.inner(), &buy_in, &opened_at],
            )
            .await?;
        Ok(TableSession {
            id,
            table,
            user,
            buy_in,
            cash_out: None,
            profit_loss: None,
            opened_at,
            closed_at: None,
        })
    }

    async fn close_session(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
        cash_out: Chips,
    ) -> anyhow::Result<TableSession> {
        let closed_at = now_unix();
        let row = self
            .client
            .query_one(
                const_format::concatcp!(
                    "UPDATE ",
                    schema::SESSIONS,
                    " SET cash_out = $3, profit_loss = $3 - buy_in, closed_at = $4
                     WHERE table_id = $1 AND user_id = $2 AND closed_at IS NULL
                     RETURNING id, table_id, user_id, buy_in, cash_out, profit_loss, opened_at, closed_at"
                ),
                &[&table.inner(), &user.inner(), &cash_out, &closed_at],
            )
            .await?;
        Ok(session_from_row(&row))
    }

    async fn find_open_session(
        &self,
        table: ID<marker::Table>,
        user: ID<marker::User>,
    ) -> anyhow::Result<Option<TableSession>> {
        let row = self
            .client
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, table_id, user_id, buy_in, cash_out, profit_loss, opened_at, closed_at FROM ",
                    schema::SESSIONS,
                    " WHERE table_id = $1 AND user_id = $2 AND closed_at IS NULL"
                ),
                &[&table.inner(), &user.inner()],
            )
            .await?;
        Ok(row.map(|row| session_from_row(&row)))
    }

    async fn create_report(
        &self,
        table: ID<marker::Table>,
        club: ID<marker::Club>,
        closed_at: i64,
    ) -> anyhow::Result<ID<marker::Report>> {
        let id = ID::<marker::Report>::default();
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    schema::REPORTS,
                    " (id, table_id, club_id, closed_at) VALUES ($1, $2, $3, $4)"
                ),
                &[&id.inner(), &table.inner(), &club.inner(), &closed_at],
            )
            .await?;
        Ok(id)
    }

    async fn append_entries(
        &self,
        report: ID<marker::Report>,
        rows: &[ReportEntry],
    ) -> anyhow::Result<()> {
        for entry in rows {
            self.client
                .execute(
                    const_format::concatcp!(
                        "INSERT INTO ",
                        schema::ENTRIES,
                        " (report_id, user_id, buy_in, cash_out, profit_loss)
                         VALUES ($1, $2, $3, $4, $5)"
                    ),
                    &[
                        &report.inner(),
                        &entry.user.inner(),
                        &entry.buy_in,
                        &entry.cash_out,
                        &entry.profit_loss,
                    ],
                )
                .await?;
        }
        Ok(())
    }

    async fn append_hand_history(&self, entry: &HandHistoryEntry) -> anyhow::Result<()> {
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    schema::HISTORY,
                    " (user_id, table_name, result, net_change, summary, created_at)
                     VALUES ($1, $2, $3, $4, $5, $6)"
                ),
                &[
                    &entry.user.inner(),
                    &entry.table_name,
                    &entry.result.as_str(),
                    &entry.net_change,
                    &entry.summary,
                    &entry.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn read_wallet(&self, user: ID<marker::User>) -> anyhow::Result<Chips> {
        let row = self
            .client
            .query_opt(
                const_format::concatcp!(
                    "SELECT balance FROM ",
                    schema::WALLETS,
                    " WHERE user_id = $1"
                ),
                &[&user.inner()],
            )
            .await?;
        Ok(row.map(|row| row.get::<_, Chips>(0)).unwrap_or(0))
    }

    async fn adjust_wallet(&self, user: ID<marker::User>, delta: Chips) -> anyhow::Result<Chips> {
        let row = self
            .client
            .query_one(
                const_format::concatcp!(
                    "INSERT INTO ",
                    schema::WALLETS,
                    " (user_id, balance) VALUES ($1, $2)
                     ON CONFLICT (user_id) DO UPDATE SET balance = ",
                    schema::WALLETS,
                    ".balance + EXCLUDED.balance
                     RETURNING balance"
                ),
                &[&user.inner(), &delta],
            )
            .await?;
        Ok(row.get::<_, Chips>(0))
    }
}
