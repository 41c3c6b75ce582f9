use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route(
            "/api/checkin",
            get(handlers::get_checkins)
                .post(handlers::add_checkin)
                .put(handlers::replace_checkins)
                .delete(handlers::reset_checkins),
        )
        .route("/api/checkin/retroactive", post(handlers::retroactive_checkin))
        .route("/api/checkin/stats", get(handlers::get_stats))
        .with_state(state)
}
