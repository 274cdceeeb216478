use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Stacker endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/schema/:kind", get(handler::schema))
        .route("/users", get(handler::list_users).post(handler::create_user))
        .route(
            "/users/:id",
            get(handler::get_user)
                .put(handler::patch_user)
                .patch(handler::patch_user)
                .delete(handler::delete_user),
        )
        .route("/users/:id/tasks", get(handler::user_tasks))
        .route("/tasks", get(handler::list_tasks).post(handler::create_task))
        .route(
            "/tasks/:id",
            get(handler::get_task)
                .put(handler::patch_task)
                .patch(handler::patch_task)
                .delete(handler::delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
