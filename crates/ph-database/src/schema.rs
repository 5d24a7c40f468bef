//! Table metadata and bootstrap DDL.
//!
//! Trimmed down from a bulk-loading `Schema` trait to the pieces a
//! transactional CRUD adapter actually needs: a name and
//! `CREATE TABLE IF NOT EXISTS` / index statements. There is no `COPY`
//! path here and no enumerable-type derivation, so `copy()`, `truncates()`,
//! `freeze()`, and `columns()` have no counterpart.

/// Table name and bootstrap DDL for one persisted entity.
pub trait Schema {
    fn name() -> &'static str;
    fn creates() -> &'static str;
    fn indices() -> &'static str;
}

#[rustfmt::skip]
pub const TABLES:   &str = "tables";
#[rustfmt::skip]
pub const STACKS:   &str = "stacks";
#[rustfmt::skip]
pub const SESSIONS: &str = "sessions";
#[rustfmt::skip]
pub const REPORTS:  &str = "reports";
#[rustfmt::skip]
pub const ENTRIES:  &str = "report_entries";
#[rustfmt::skip]
pub const HISTORY:  &str = "hand_history";
#[rustfmt::skip]
pub const WALLETS:  &str = "wallets";

use crate::model::{HandHistoryEntry, ReportEntry, TableMeta, TableSession, TableStack};

impl Schema for TableMeta {
    fn name() -> &'static str {
        TABLES
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            TABLES,
            " (
                id                      UUID PRIMARY KEY,
                club_id                 UUID NOT NULL,
                creator_id              UUID NOT NULL,
                name                    TEXT,
                max_seats               SMALLINT NOT NULL,
                small_blind             BIGINT NOT NULL,
                big_blind               BIGINT NOT NULL,
                game_kind               TEXT NOT NULL,
                bomb_pot_every_n_hands  BIGINT,
                bomb_pot_amount         BIGINT NOT NULL,
                status                  TEXT NOT NULL,
                created_at              BIGINT NOT NULL
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_",
            TABLES,
            "_club ON ",
            TABLES,
            " (club_id);"
        )
    }
}

impl Schema for TableStack {
    fn name() -> &'static str {
        STACKS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            STACKS,
            " (
                table_id    UUID NOT NULL,
                user_id     UUID NOT NULL,
                seat        SMALLINT NOT NULL,
                stack       BIGINT NOT NULL,
                name        TEXT NOT NULL,
                avatar      TEXT,
                updated_at  BIGINT NOT NULL,
                PRIMARY KEY (table_id, user_id)
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_",
            STACKS,
            "_table ON ",
            STACKS,
            " (table_id);"
        )
    }
}

impl Schema for TableSession {
    fn name() -> &'static str {
        SESSIONS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            SESSIONS,
            " (
                id            UUID PRIMARY KEY,
                table_id      UUID NOT NULL,
                user_id       UUID NOT NULL,
                buy_in        BIGINT NOT NULL,
                cash_out      BIGINT,
                profit_loss   BIGINT,
                opened_at     BIGINT NOT NULL,
                closed_at     BIGINT
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_",
            SESSIONS,
            "_open ON ",
            SESSIONS,
            " (table_id, user_id) WHERE closed_at IS NULL;"
        )
    }
}

/// Report header row; entries live in [`ENTRIES`] keyed by `report_id`.
pub struct TableReport;

impl Schema for TableReport {
    fn name() -> &'static str {
        REPORTS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            REPORTS,
            " (
                id         UUID PRIMARY KEY,
                table_id   UUID NOT NULL,
                club_id    UUID NOT NULL,
                closed_at  BIGINT NOT NULL
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_",
            REPORTS,
            "_table ON ",
            REPORTS,
            " (table_id);"
        )
    }
}

impl Schema for ReportEntry {
    fn name() -> &'static str {
        ENTRIES
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            ENTRIES,
            " (
                report_id    UUID NOT NULL,
                user_id      UUID NOT NULL,
                buy_in       BIGINT NOT NULL,
                cash_out     BIGINT NOT NULL,
                profit_loss  BIGINT NOT NULL,
                PRIMARY KEY (report_id, user_id)
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_",
            ENTRIES,
            "_report ON ",
            ENTRIES,
            " (report_id);"
        )
    }
}

impl Schema for HandHistoryEntry {
    fn name() -> &'static str {
        HISTORY
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            HISTORY,
            " (
                id          BIGSERIAL PRIMARY KEY,
                user_id     UUID NOT NULL,
                table_name  TEXT NOT NULL,
                result      TEXT NOT NULL,
                net_change  BIGINT NOT NULL,
                summary     TEXT NOT NULL,
                created_at  BIGINT NOT NULL
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_",
            HISTORY,
            "_user ON ",
            HISTORY,
            " (user_id, created_at DESC);"
        )
    }
}

/// Wallet row; owned by persistence, touched by the core only via
/// [`crate::Store::read_wallet`]/[`crate::Store::adjust_wallet`].
pub struct Wallet;

impl Schema for Wallet {
    fn name() -> &'static str {
        WALLETS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            WALLETS,
            " (
                user_id  UUID PRIMARY KEY,
                balance  BIGINT NOT NULL DEFAULT 0
            );"
        )
    }
    fn indices() -> &'static str {
        ""
    }
}

/// `CREATE TABLE`+`CREATE INDEX` for every entity, run once at startup.
pub const BOOTSTRAP: &[(fn() -> &'static str, fn() -> &'static str)] = &[
    (TableMeta::creates, TableMeta::indices),
    (TableStack::creates, TableStack::indices),
    (TableSession::creates, TableSession::indices),
    (TableReport::creates, TableReport::indices),
    (ReportEntry::creates, ReportEntry::indices),
    (HandHistoryEntry::creates, HandHistoryEntry::indices),
    (Wallet::creates, Wallet::indices),
];
