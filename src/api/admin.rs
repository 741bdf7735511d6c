use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{Html, Response};

use crate::state::AppState;

/// `GET /api/healthz`
pub async fn healthz_handler() -> &'static str {
    "OK"
}

/// `GET /admin/metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n<body>\n  <h1>Welcome, Chirpy Admin</h1>\n  <p>Chirpy has been visited {} times!</p>\n</body>\n</html>\n",
        state.hits()
    ))
}

/// `POST /api/reset`
pub async fn reset_handler(State(state): State<AppState>) -> &'static str {
    state.reset_hits();
    "OK"
}

/// Counts every request that reaches the static file server.
pub async fn count_hits(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.record_hit();
    next.run(request).await
}
