use std::sync::Arc;

use actix_web::{web, HttpResponse};
use ph_auth::Auth;
use ph_core::{marker, Error, ID};
use ph_database::{TableMeta, TableStatus};
use ph_session::masked_view;

use crate::dto::*;
use crate::error::ApiResult;
use crate::handlers::{load_meta, now_unix, require_member, require_owner, settle};
use crate::state::AppState;

type Path1 = web::Path<uuid::Uuid>;

fn table_view_response(table: &ph_engine::Table, viewer: Option<ID<marker::User>>) -> HttpResponse {
    HttpResponse::Ok().json(ServerMessage::TableState(TableStateDto::from(masked_view(table, viewer))))
}

pub async fn create_table(
    state: web::Data<Arc<AppState>>,
    auth: Auth,
    body: web::Json<CreateTableRequest>,
) -> ApiResult<HttpResponse> {
    let user = auth.user();
    require_owner(&state, body.club, user).await?;

    if body.small_blind <= 0 {
        return Err(Error::invalid("small blind must be positive").into());
    }
    if body.big_blind <= body.small_blind {
        return Err(Error::invalid("big blind must exceed small blind").into());
    }
    if body.max_seats < 2 || body.max_seats > 9 {
        return Err(Error::invalid("max seats must be between 2 and 9").into());
    }
    if matches!(body.game_kind, ph_cards::GameKind::Omaha) && body.bomb_pot_every_n_hands.is_some() {
        // Bomb pots are a Hold'em/Omaha-agnostic cadence; no extra
        // restriction here beyond the shared seat/blind validation above.
    }

    let meta = TableMeta {
        id: ID::default(),
        club: body.club,
        creator: user,
        name: body.name.clone(),
        max_seats: body.max_seats,
        small_blind: body.small_blind,
        big_blind: body.big_blind,
        game_kind: body.game_kind,
        bomb_pot_every_n_hands: body.bomb_pot_every_n_hands,
        bomb_pot_amount: body.bomb_pot_amount.unwrap_or(0),
        status: TableStatus::Active,
        created_at: now_unix(),
    };
    let table_id = meta.id;
    state.sessions.create_table(meta).await?;
    Ok(HttpResponse::Ok().json(CreateTableResponse { table_id }))
}

pub async fn close_table(state: web::Data<Arc<AppState>>, auth: Auth, path: Path1) -> ApiResult<HttpResponse> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let meta = load_meta(&state, id).await?;
    require_owner(&state, meta.club, auth.user()).await?;
    state.sessions.close_table(id, meta.club).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "closed" })))
}

pub async fn sit(
    state: web::Data<Arc<AppState>>,
    auth: Auth,
    path: Path1,
    body: web::Json<SitRequest>,
) -> ApiResult<HttpResponse> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let user = auth.user();
    let meta = load_meta(&state, id).await?;
    require_member(&state, &meta, user).await?;

    if body.buy_in <= 0 {
        return Err(Error::invalid("buy-in must be positive").into());
    }
    if state.store.find_open_session(id, user).await.map_err(|e| Error::illegal(e.to_string()))?.is_some() {
        return Err(Error::conflict("already has an open session at this table").into());
    }
    let balance = state.store.read_wallet(user).await.map_err(|e| Error::illegal(e.to_string()))?;
    if balance < body.buy_in {
        return Err(Error::invalid("insufficient wallet balance for buy-in").into());
    }

    let handle = state.sessions.table(id).await?;
    let (player_id, seat) = {
        let mut table = handle.engine.lock().await;
        let player = table.add_player(display_name(&auth), body.buy_in, Some(user), None, body.seat)?;
        (player.id, player.seat)
    };
    state.store.adjust_wallet(user, -body.buy_in).await.map_err(|e| Error::illegal(e.to_string()))?;
    state.store.open_session(id, user, body.buy_in).await.map_err(|e| Error::illegal(e.to_string()))?;

    settle(&state, id, &handle).await?;
    Ok(HttpResponse::Ok().json(SitResponse { player_id, seat }))
}

fn display_name(auth: &Auth) -> String {
    format!("player-{}", &auth.user().to_string()[..8])
}

pub async fn change_seat(
    state: web::Data<Arc<AppState>>,
    auth: Auth,
    path: Path1,
    body: web::Json<ChangeSeatRequest>,
) -> ApiResult<HttpResponse> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let user = auth.user();
    let meta = load_meta(&state, id).await?;
    require_member(&state, &meta, user).await?;

    let handle = state.sessions.table(id).await?;
    {
        let mut table = handle.engine.lock().await;
        table.move_to_seat(user, body.seat)?;
    }
    settle(&state, id, &handle).await?;
    let table = handle.engine.lock().await;
    Ok(table_view_response(&table, Some(user)))
}

pub async fn leave(state: web::Data<Arc<AppState>>, auth: Auth, path: Path1) -> ApiResult<HttpResponse> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let user = auth.user();
    let meta = load_meta(&state, id).await?;
    require_member(&state, &meta, user).await?;

    let handle = state.sessions.table(id).await?;
    let (seat, returned, pending) = {
        let mut table = handle.engine.lock().await;
        match table.leave(user)? {
            Some(player) => (Some(player.seat), Some(player.stack), false),
            None => (None, None, true),
        }
    };
    if let Some(amount) = returned {
        state.store.adjust_wallet(user, amount).await.map_err(|e| Error::illegal(e.to_string()))?;
        state.store.close_session(id, user, amount).await.map_err(|e| Error::illegal(e.to_string()))?;
        state.store.delete_stack(id, user).await.map_err(|e| Error::illegal(e.to_string()))?;
    }
    settle(&state, id, &handle).await?;
    Ok(HttpResponse::Ok().json(LeaveResponse {
        seat,
        returned_amount: returned,
        pending,
    }))
}

pub async fn sit_out(state: web::Data<Arc<AppState>>, auth: Auth, path: Path1) -> ApiResult<HttpResponse> {
    run_seat_command(state, auth, path, |table, pid| table.sit_out(pid)).await
}

pub async fn return_to_play(state: web::Data<Arc<AppState>>, auth: Auth, path: Path1) -> ApiResult<HttpResponse> {
    run_seat_command(state, auth, path, |table, pid| table.return_to_play(pid)).await
}

async fn run_seat_command(
    state: web::Data<Arc<AppState>>,
    auth: Auth,
    path: Path1,
    op: impl FnOnce(&mut ph_engine::Table, ph_engine::PlayerId) -> ph_core::Result<()>,
) -> ApiResult<HttpResponse> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let user = auth.user();
    let meta = load_meta(&state, id).await?;
    require_member(&state, &meta, user).await?;

    let handle = state.sessions.table(id).await?;
    {
        let mut table = handle.engine.lock().await;
        let player_id = table
            .players()
            .iter()
            .find(|p| p.user_id == Some(user))
            .map(|p| p.id)
            .ok_or_else(|| Error::not_found("player not seated"))?;
        op(&mut table, player_id)?;
    }
    settle(&state, id, &handle).await?;
    let table = handle.engine.lock().await;
    Ok(table_view_response(&table, Some(user)))
}

pub async fn start_hand(state: web::Data<Arc<AppState>>, auth: Auth, path: Path1) -> ApiResult<HttpResponse> {
    run_table_command(state, auth, path, |table| table.start_new_hand()).await
}

pub async fn deal_flop(state: web::Data<Arc<AppState>>, auth: Auth, path: Path1) -> ApiResult<HttpResponse> {
    run_table_command(state, auth, path, |table| table.deal_flop()).await
}

pub async fn deal_turn(state: web::Data<Arc<AppState>>, auth: Auth, path: Path1) -> ApiResult<HttpResponse> {
    run_table_command(state, auth, path, |table| table.deal_turn()).await
}

pub async fn deal_river(state: web::Data<Arc<AppState>>, auth: Auth, path: Path1) -> ApiResult<HttpResponse> {
    run_table_command(state, auth, path, |table| table.deal_river()).await
}

pub async fn showdown(state: web::Data<Arc<AppState>>, auth: Auth, path: Path1) -> ApiResult<HttpResponse> {
    run_table_command(state, auth, path, |table| table.showdown().map(|_| ())).await
}

async fn run_table_command(
    state: web::Data<Arc<AppState>>,
    auth: Auth,
    path: Path1,
    op: impl FnOnce(&mut ph_engine::Table) -> ph_core::Result<()>,
) -> ApiResult<HttpResponse> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let user = auth.user();
    let meta = load_meta(&state, id).await?;
    require_member(&state, &meta, user).await?;

    let handle = state.sessions.table(id).await?;
    {
        let mut table = handle.engine.lock().await;
        op(&mut table)?;
    }
    settle(&state, id, &handle).await?;
    let table = handle.engine.lock().await;
    Ok(table_view_response(&table, Some(user)))
}

pub async fn act(
    state: web::Data<Arc<AppState>>,
    auth: Auth,
    path: Path1,
    body: web::Json<ActRequest>,
) -> ApiResult<HttpResponse> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let user = auth.user();
    let meta = load_meta(&state, id).await?;
    require_member(&state, &meta, user).await?;
    let action = body.to_action()?;

    let handle = state.sessions.table(id).await?;
    {
        let mut table = handle.engine.lock().await;
        let player = table
            .player_by_id(body.player_id)
            .ok_or_else(|| Error::not_found("player not seated"))?;
        if player.user_id != Some(user) {
            return Err(Error::forbidden("player id does not belong to this user").into());
        }
        table.act(body.player_id, action)?;
    }
    settle(&state, id, &handle).await?;
    let table = handle.engine.lock().await;
    Ok(table_view_response(&table, Some(user)))
}

pub async fn request_runouts(
    state: web::Data<Arc<AppState>>,
    auth: Auth,
    path: Path1,
    body: web::Json<RunoutRequest>,
) -> ApiResult<HttpResponse> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let user = auth.user();
    let meta = load_meta(&state, id).await?;
    require_member(&state, &meta, user).await?;

    let handle = state.sessions.table(id).await?;
    {
        let mut table = handle.engine.lock().await;
        table.request_runouts(body.player_id, body.count)?;
    }
    settle(&state, id, &handle).await?;
    let table = handle.engine.lock().await;
    Ok(table_view_response(&table, Some(user)))
}

pub async fn respond_runouts(
    state: web::Data<Arc<AppState>>,
    auth: Auth,
    path: Path1,
    body: web::Json<RunoutResponseRequest>,
) -> ApiResult<HttpResponse> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let user = auth.user();
    let meta = load_meta(&state, id).await?;
    require_member(&state, &meta, user).await?;

    let handle = state.sessions.table(id).await?;
    {
        let mut table = handle.engine.lock().await;
        table.respond_runouts(body.player_id, body.accept)?;
    }
    settle(&state, id, &handle).await?;
    let table = handle.engine.lock().await;
    Ok(table_view_response(&table, Some(user)))
}

pub async fn online_count(state: web::Data<Arc<AppState>>, auth: Auth) -> ApiResult<HttpResponse> {
    let n = state.sessions.registry().online_count(auth.user());
    Ok(HttpResponse::Ok().json(OnlineCountResponse { n }))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}
