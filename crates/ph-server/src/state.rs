use std::sync::Arc;

use ph_database::Store;
use ph_session::SessionService;

use crate::membership::MembershipGate;

/// Everything an edge handler needs, bundled as one `app_data` value
/// threaded through `actix_web::App`.
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub store: Arc<dyn Store>,
    pub membership: Arc<dyn MembershipGate>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, membership: Arc<dyn MembershipGate>) -> Arc<Self> {
        Arc::new(Self {
            sessions: SessionService::new(store.clone()),
            store,
            membership,
        })
    }
}
