use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures::StreamExt;
use ph_auth::Crypto;
use ph_core::{marker, Error, ID};

use crate::dto::{ClientMessage, ServerMessage};
use crate::handlers::now_unix;
use crate::state::AppState;

/// Bridges a websocket connection to a table's broadcast channel: relays
/// outbound frames from the table's mpsc receiver into an
/// `actix_ws::Session` and forwards inbound text frames back. Spectators
/// are welcome: the `token` query param is optional, and an absent or
/// invalid one just means an anonymous viewer.
pub async fn enter(
    state: web::Data<Arc<AppState>>,
    tokens: web::Data<Crypto>,
    path: web::Path<uuid::Uuid>,
    query: web::Query<HashMap<String, String>>,
    body: web::Payload,
    req: HttpRequest,
) -> actix_web::Result<impl Responder> {
    let id: ID<marker::Table> = ID::from(path.into_inner());
    let user_id = query
        .get("token")
        .and_then(|t| tokens.decode(t).ok())
        .map(|claims| claims.user());

    let handle = state
        .sessions
        .table(id)
        .await
        .map_err(|e| actix_web::error::ErrorNotFound(e.to_string()))?;

    let (response, mut session, mut stream) = actix_ws::handle(&req, body)?;
    let (channel_id, mut rx) = handle.subscribe(user_id);

    match user_id {
        Some(user) => log::info!("[channel {id}] user {user} connected"),
        None => log::info!("[channel {id}] spectator connected"),
    }

    actix_web::rt::spawn(async move {
        'bridge: loop {
            tokio::select! {
                biased;
                frame = rx.recv() => match frame {
                    Some(frame) => {
                        let message = ServerMessage::from(frame).to_json();
                        if session.text(message).await.is_err() {
                            break 'bridge;
                        }
                    }
                    None => break 'bridge,
                },
                incoming = stream.next() => match incoming {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        if let Err(e) = handle_inbound(&state, id, user_id, &text).await {
                            log::warn!("[channel {id}] inbound message rejected: {e}");
                        }
                    }
                    Some(Ok(actix_ws::Message::Close(_))) | None => break 'bridge,
                    Some(Err(_)) => break 'bridge,
                    _ => continue 'bridge,
                },
            }
        }
        handle.unsubscribe(channel_id);
        log::info!("[channel {id}] channel {channel_id} disconnected");
    });

    Ok(response)
}

/// Everything a client can send over an open channel: a chat line if
/// authenticated, or any other payload, which is interpreted as a
/// request to resync and simply triggers a fresh broadcast.
async fn handle_inbound(
    state: &Arc<AppState>,
    id: ID<marker::Table>,
    user_id: Option<ID<marker::User>>,
    text: &str,
) -> ph_core::Result<()> {
    let handle = state.sessions.table(id).await?;
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::ChatMessage { message }) => {
            let user = user_id.ok_or_else(|| Error::forbidden("chat requires authentication"))?;
            let username = format!("player-{}", &user.to_string()[..8]);
            handle.post_chat(user, username, &message, now_unix())?;
        }
        Ok(ClientMessage::Other) | Err(_) => {
            let table = handle.engine.lock().await;
            handle.broadcast(&table);
        }
    }
    Ok(())
}
