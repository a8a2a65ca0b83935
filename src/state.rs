use std::sync::Arc;

use crate::notify::Mailer;
use crate::store::Store;

/// Shared application state, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    /// HS256 secret used to sign and verify session tokens.
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, jwt_secret: impl Into<String>) -> Self {
        Self {
            store,
            mailer,
            jwt_secret: jwt_secret.into(),
        }
    }
}
