use std::path::Path;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::api::files::{hide_store_files, StaticFiles};
use crate::state::AppState;

/// Build the full router: JSON API under `/api`, admin pages under `/admin`,
/// and a hit-counted static file server under `/app` that never exposes the
/// document store.
pub fn build_router(state: AppState, static_root: impl AsRef<Path>) -> Router {
    let api_routes = Router::new()
        .route("/healthz", get(api::admin::healthz_handler))
        .route("/reset", post(api::admin::reset_handler))
        .route(
            "/chirps",
            get(api::chirps::list_chirps_handler).post(api::chirps::create_chirp_handler),
        )
        .route(
            "/chirps/{id}",
            get(api::chirps::get_chirp_handler).delete(api::chirps::delete_chirp_handler),
        )
        .route(
            "/users",
            post(api::users::create_user_handler).put(api::users::update_user_handler),
        )
        .route("/login", post(api::users::login_handler))
        .route("/refresh", post(api::tokens::refresh_handler))
        .route("/revoke", post(api::tokens::revoke_handler))
        .route("/polka/webhooks", post(api::webhooks::polka_webhook_handler));

    let admin_routes = Router::new().route("/metrics", get(api::admin::metrics_handler));

    let static_files = StaticFiles::new(static_root.as_ref(), &state.store_files);
    let file_server = Router::new()
        .nest_service("/app", ServeDir::new(static_files.root()))
        .layer(axum::middleware::from_fn_with_state(
            static_files,
            hide_store_files,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            api::admin::count_hits,
        ));

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .merge(file_server)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
