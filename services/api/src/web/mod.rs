pub mod auth;
pub mod diary;
pub mod memoir;
pub mod middleware;
pub mod period;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod stats;
pub mod ws_handler;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use middleware::require_auth;
pub use ws_handler::ws_handler;

use state::AppState;

/// Builds the API router. Everything except signup, login and logout sits
/// behind `require_auth`.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/auth/signup", post(auth::signup_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me_handler))
        .route(
            "/api/auth/user-preferences",
            get(auth::get_preferences_handler).put(auth::update_preferences_handler),
        )
        .route(
            "/api/auth/update-menu-preferences",
            post(auth::update_menu_preferences_handler),
        )
        .route(
            "/api/diary-entries",
            get(diary::list_entries_handler).post(diary::create_entry_handler),
        )
        .route(
            "/api/diary-entries/search/{query}",
            get(diary::search_entries_handler),
        )
        .route(
            "/api/diary-entries/{id}",
            get(diary::get_entry_handler)
                .put(diary::update_entry_handler)
                .delete(diary::delete_entry_handler),
        )
        .route(
            "/api/diary-entries/{id}/analysis",
            get(diary::get_analysis_handler)
                .post(diary::create_analysis_handler)
                .put(diary::regenerate_analysis_handler)
                .delete(diary::delete_analysis_handler),
        )
        .route(
            "/api/memoir-entries",
            get(memoir::list_memoirs_handler).post(memoir::create_memoir_handler),
        )
        .route(
            "/api/memoir-entries/{id}",
            get(memoir::get_memoir_handler)
                .put(memoir::update_memoir_handler)
                .delete(memoir::delete_memoir_handler),
        )
        .route(
            "/api/period-records",
            get(period::list_records_handler).post(period::create_record_handler),
        )
        .route("/api/period-records/summary", get(period::cycle_summary_handler))
        .route("/api/period-records/calendar", get(period::calendar_handler))
        .route(
            "/api/period-records/{id}",
            get(period::get_record_handler)
                .put(period::update_record_handler)
                .delete(period::delete_record_handler),
        )
        .route("/api/stats", get(stats::journal_stats_handler))
        .route("/ws/emotion", get(ws_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
