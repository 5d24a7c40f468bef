use std::sync::Arc;

use ph_database::PgStore;
use ph_server::membership::PgMembershipGate;
use ph_server::state::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let store = PgStore::connect().await.expect("connect to database");
    let membership = Arc::new(PgMembershipGate::new(store.client()));
    let state = AppState::new(Arc::new(store), membership);
    ph_server::run(state).await
}
