// --- File: crates/services/gactivity_backend/src/routes.rs ---
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::handlers::{
    calendar_collection_handler, datasets_handler, drive_activity_handler, index_handler,
    login_handler, logout_handler, oauth_callback_handler,
};

/// Every route of the web front end.
pub fn routes(state: AppState) -> Router {
    let callback_path = state.config.google_oauth.redirect_path.clone();

    Router::new()
        .route("/", get(index_handler))
        .route("/login", get(login_handler))
        .route(&callback_path, get(oauth_callback_handler))
        .route("/logout", get(logout_handler))
        .route("/calendar-collection", get(calendar_collection_handler))
        .route("/drive-activity", get(drive_activity_handler))
        .route("/bigquery/datasets", get(datasets_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
