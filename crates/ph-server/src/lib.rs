//! Edge layer: the HTTP command surface, the websocket channel bridge, the
//! wire DTOs that mask hole cards on the way out, and the authorization
//! gates every mutating command runs through before it reaches a table.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod membership;
pub mod state;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use ph_auth::Crypto;

use crate::state::AppState;

#[rustfmt::skip]
pub async fn run(state: Arc<AppState>) -> std::io::Result<()> {
    let state = web::Data::new(state);
    let crypto = web::Data::new(Crypto::from_env());
    let bind_addr = ph_core::env::bind_addr();
    log::info!("starting server on {bind_addr}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
            .app_data(state.clone())
            .app_data(crypto.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/online", web::get().to(handlers::online_count))
            .service(
                web::scope("/tables")
                    .route("", web::post().to(handlers::create_table))
                    .route("/{table_id}/enter", web::get().to(handlers::enter))
                    .route("/{table_id}/close", web::post().to(handlers::close_table))
                    .route("/{table_id}/sit", web::post().to(handlers::sit))
                    .route("/{table_id}/seat", web::post().to(handlers::change_seat))
                    .route("/{table_id}/leave", web::post().to(handlers::leave))
                    .route("/{table_id}/sit-out", web::post().to(handlers::sit_out))
                    .route("/{table_id}/return", web::post().to(handlers::return_to_play))
                    .route("/{table_id}/act", web::post().to(handlers::act))
                    .route("/{table_id}/deal/flop", web::post().to(handlers::deal_flop))
                    .route("/{table_id}/deal/turn", web::post().to(handlers::deal_turn))
                    .route("/{table_id}/deal/river", web::post().to(handlers::deal_river))
                    .route("/{table_id}/deal/start", web::post().to(handlers::start_hand))
                    .route("/{table_id}/showdown", web::post().to(handlers::showdown))
                    .route("/{table_id}/runouts", web::post().to(handlers::request_runouts))
                    .route("/{table_id}/runouts/respond", web::post().to(handlers::respond_runouts)),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
