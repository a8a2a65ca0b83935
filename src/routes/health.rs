use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// Public liveness and readiness check.
///
/// Answers `200` with `"store": "up"` when a round trip to the store succeeds and `503`
/// with `"store": "down"` otherwise. The mailer is never contacted.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let (mut response, status, store) = match state.store.ping().await {
        Ok(()) => (HttpResponse::Ok(), "ok", "up"),
        Err(e) => {
            log::error!("Health check could not reach the store: {}", e);
            (HttpResponse::ServiceUnavailable(), "degraded", "down")
        }
    };
    response.json(json!({
        "status": status,
        "store": store,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}
