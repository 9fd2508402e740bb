//! Application router.
//!
//! Returns a composable `Router` with the CORS layer applied. Consent
//! gating happens in the handlers (see `endpoints`); the router adds
//! no middleware beyond CORS.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the application router.
pub fn app_router(ctx: ApiContext, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .route("/", get(endpoints::health::home))
        .route("/health", get(endpoints::health::check))
        .route("/consent", get(endpoints::consent::set))
        .route("/snapshot", get(endpoints::snapshot::get))
        .route("/chat", post(endpoints::chat::send))
        .route("/chatmock", post(endpoints::chat::send_mock))
        .with_state(ctx)
        .layer(cors)
}
