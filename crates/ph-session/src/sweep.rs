use std::collections::HashMap;

use ph_core::{marker, Error, Result, ID};
use ph_database::{HandHistoryEntry, HandResult};
use ph_engine::Street;

use crate::registry::{Registry, TableHandle};

/// One pass of the background tick over a single table: times out the
/// player on the clock, auto-removes long-idle sat-out seats, advances
/// the street/hand when a round has closed, and flushes hand history and
/// stacks. Returns `true` if anything changed (worth a broadcast).
pub async fn sweep_table(id: ID<marker::Table>, handle: &TableHandle, registry: &Registry, now: i64, grace_secs: u64) -> Result<bool> {
    let mut table = handle.engine.lock().await;
    let mut changed = false;

    if table.enforce_action_timeout()? {
        changed = true;
    }

    changed |= auto_remove_idle(id, &mut table, handle, registry, grace_secs).await?;
    changed |= flush_pending_leaves(id, &mut table, handle, registry, now).await?;
    changed |= auto_progress(&mut table, handle, registry, now).await?;

    if changed {
        handle.broadcast(&table);
        registry.persist_stacks(id, &table, now).await?;
    }
    Ok(changed)
}

async fn auto_remove_idle(
    id: ID<marker::Table>,
    table: &mut ph_engine::Table,
    handle: &TableHandle,
    registry: &Registry,
    grace_secs: u64,
) -> Result<bool> {
    let expired: Vec<ID<marker::User>> = table
        .players()
        .iter()
        .filter_map(|p| {
            let since = p.sat_out_since?;
            let user = p.user_id?;
            let elapsed = since.elapsed().as_secs();
            (elapsed >= grace_secs).then_some(user)
        })
        .collect();
    let mut changed = false;
    for user_id in expired {
        if let Some(player) = table.leave(user_id)? {
            changed = true;
            settle_departure(id, user_id, player.stack, registry).await?;
        }
    }
    Ok(changed)
}

async fn flush_pending_leaves(
    id: ID<marker::Table>,
    table: &mut ph_engine::Table,
    _handle: &TableHandle,
    registry: &Registry,
    _now: i64,
) -> Result<bool> {
    let departed = table.take_pending_leaves();
    let mut changed = false;
    for player in departed {
        if let Some(user_id) = player.user_id {
            changed = true;
            settle_departure(id, user_id, player.stack, registry).await?;
        }
    }
    Ok(changed)
}

/// Credits a departing player's remaining stack to their wallet, closes
/// their session, and drops their stack row.
async fn settle_departure(id: ID<marker::Table>, user_id: ID<marker::User>, remaining: ph_core::Chips, registry: &Registry) -> Result<()> {
    let store = registry.store();
    store
        .close_session(id, user_id, remaining)
        .await
        .map_err(|e| Error::illegal(e.to_string()))?;
    store
        .adjust_wallet(user_id, remaining)
        .await
        .map_err(|e| Error::illegal(e.to_string()))?;
    store
        .delete_stack(id, user_id)
        .await
        .map_err(|e| Error::illegal(e.to_string()))?;
    Ok(())
}

async fn auto_progress(table: &mut ph_engine::Table, handle: &TableHandle, registry: &Registry, now: i64) -> Result<bool> {
    let mut changed = false;

    if table.street() != Street::PreHand
        && table.street() != Street::Showdown
        && table.next_to_act().is_none()
    {
        if table.all_players_all_in() {
            let settlement = table.resolve_all_in_showdown()?;
            record_hand_history(table, handle, registry, &settlement, now).await?;
            changed = true;
        } else {
            match table.street() {
                Street::Preflop => {
                    table.deal_flop()?;
                    changed = true;
                }
                Street::Flop => {
                    table.deal_turn()?;
                    changed = true;
                }
                Street::Turn => {
                    table.deal_river()?;
                    changed = true;
                }
                Street::River => {
                    let settlement = table.showdown()?;
                    record_hand_history(table, handle, registry, &settlement, now).await?;
                    changed = true;
                }
                _ => {}
            }
        }
    } else if table.street() == Street::Showdown && !handle.hand_start_stacks.lock().unwrap().is_empty() {
        // A hand that ends by everyone-but-one folding finalizes
        // synchronously inside `act()`, reaching `Showdown` before this
        // sweep ever observes it on the river/all-in branches above;
        // catch that settlement here instead. `hand_start_stacks` being
        // non-empty means the hand hasn't had its history written yet.
        if let Some(settlement) = table.last_settlement().cloned() {
            record_hand_history(table, handle, registry, &settlement, now).await?;
            changed = true;
        }
    }

    if matches!(table.street(), Street::PreHand | Street::Showdown) {
        let eligible = table.players().iter().filter(|p| p.is_eligible_for_hand()).count();
        if eligible >= 2 {
            table.start_new_hand()?;
            let snapshot: HashMap<_, _> = table
                .players()
                .iter()
                .filter_map(|p| p.user_id.map(|uid| (uid, p.stack + p.committed)))
                .collect();
            *handle.hand_start_stacks.lock().unwrap() = snapshot;
            changed = true;
        }
    }

    Ok(changed)
}

async fn record_hand_history(
    table: &ph_engine::Table,
    handle: &TableHandle,
    registry: &Registry,
    _settlement: &ph_engine::Settlement,
    now: i64,
) -> Result<()> {
    let starting = std::mem::take(&mut *handle.hand_start_stacks.lock().unwrap());
    if starting.is_empty() {
        return Ok(());
    }
    let store = registry.store();
    for player in table.players() {
        let Some(user_id) = player.user_id else { continue };
        let Some(&start_stack) = starting.get(&user_id) else { continue };
        let net_change = player.stack - start_stack;
        let entry = HandHistoryEntry {
            user: user_id,
            table_name: handle.name.clone(),
            result: HandResult::from_net(net_change),
            net_change,
            summary: format!("hand #{}", table.hand_number()),
            created_at: now,
        };
        store
            .append_hand_history(&entry)
            .await
            .map_err(|e| Error::illegal(e.to_string()))?;
    }
    Ok(())
}
