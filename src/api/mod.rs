use crate::{
    api::handlers::{alerts, health, reports, root, user_login, user_register},
    auth::{PasswordHasher, TokenService, guard::require_bearer},
    store::Store,
};
use anyhow::Result;
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

mod error;
pub mod handlers;
mod openapi;

pub use error::{ApiError, ErrorBody};
pub use openapi::openapi;

/// Long-lived dependencies shared by every request.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub hasher: Arc<PasswordHasher>,
}

/// Build the application router.
///
/// `/alerts/:user_id` and `/reports` sit behind the Access Guard; everything
/// else is public.
pub fn router(services: &Services) -> Router {
    let protected = Router::new()
        .route("/alerts/:user_id", get(alerts::alerts))
        .route("/reports", post(reports::submit_report))
        .route_layer(middleware::from_fn_with_state(
            services.tokens.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health).options(health::health))
        .route("/openapi.json", get(|| async { Json(openapi()) }))
        .route("/register", post(user_register::register))
        .route("/login", post(user_login::login))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(services.store.clone()))
                .layer(Extension(services.tokens.clone()))
                .layer(Extension(services.hasher.clone())),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, services: Services) -> Result<()> {
    let app = router(&services);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
