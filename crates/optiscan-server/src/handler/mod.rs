//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod documents;
mod error;
mod monitors;
pub mod request;
pub mod response;
mod tasks;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use tower_http::limit::RequestBodyLimitLayer;

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Upper bound on request body size.
///
/// Uploads arrive base64-encoded, which inflates the raw bytes by a third,
/// so the cap is set well above the largest expected scan.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all gateway routes.
///
/// The body limit replaces axum's 2 MB default, which is too small for
/// base64 document uploads.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(documents::routes())
        .merge(tasks::routes())
        .merge(monitors::routes())
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

#[cfg(test)]
mod test {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum_test::TestServer;

    use super::*;

    #[tokio::test]
    async fn unknown_routes_return_not_found() -> anyhow::Result<()> {
        let app: Router = Router::new().fallback(fallback);
        let server = TestServer::new(app)?;

        let response = server.get("/nope").await;
        response.assert_status_not_found();

        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }

    async fn echo_len(body: String) -> String {
        body.len().to_string()
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() -> anyhow::Result<()> {
        let app: Router = Router::new()
            .route("/documents", post(echo_len))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));
        let server = TestServer::new(app)?;

        let response = server
            .post("/documents")
            .text("x".repeat(MAX_BODY_BYTES + 1))
            .await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        let response = server.post("/documents").text("small").await;
        response.assert_status_ok();
        Ok(())
    }
}
