mod channel;
mod tables;

pub use channel::enter;
pub use tables::*;

use std::sync::Arc;

use ph_core::{marker, Error, Result, ID};
use ph_database::TableMeta;
use ph_session::{sweep_table, TableHandle};

use crate::state::AppState;

pub(crate) fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub(crate) async fn load_meta(state: &AppState, id: ID<marker::Table>) -> Result<TableMeta> {
    state
        .store
        .load_table_meta(id)
        .await
        .map_err(|e| Error::illegal(e.to_string()))?
        .ok_or_else(|| Error::not_found("table"))
}

/// Approved-membership gate every seat/act command runs through.
pub(crate) async fn require_member(state: &AppState, meta: &TableMeta, user: ID<marker::User>) -> Result<()> {
    let approved = state
        .membership
        .is_member(meta.club, user)
        .await
        .map_err(|e| Error::illegal(e.to_string()))?;
    if approved {
        Ok(())
    } else {
        Err(Error::forbidden("not an approved member of this table's club"))
    }
}

/// Owner-only gate for create/close/admin commands.
pub(crate) async fn require_owner(state: &AppState, club: ID<marker::Club>, user: ID<marker::User>) -> Result<()> {
    let owner = state
        .membership
        .is_owner(club, user)
        .await
        .map_err(|e| Error::illegal(e.to_string()))?;
    if owner {
        Ok(())
    } else {
        Err(Error::forbidden("owner-only command"))
    }
}

/// Runs the per-table follow-up every mutating command needs: a fresh
/// broadcast of the mutation itself, then the same sweep the background
/// tick runs (timeout enforcement, idle auto-removal, auto-progression),
/// so a single HTTP call observes every knock-on effect of its own
/// action. Broadcast and persistence run under the same lock as the
/// mutation that triggered them.
pub(crate) async fn settle(state: &Arc<AppState>, id: ID<marker::Table>, handle: &Arc<TableHandle>) -> Result<()> {
    let now = now_unix();
    {
        let table = handle.engine.lock().await;
        handle.broadcast(&table);
        state.sessions.registry().persist_stacks(id, &table, now).await?;
    }
    sweep_table(id, handle, state.sessions.registry(), now, ph_core::env::sit_out_grace_secs()).await?;
    Ok(())
}
