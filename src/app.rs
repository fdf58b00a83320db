use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, moments};

pub const BANNER: &str = "Momentos API Server v1.0";

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { BANNER }))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(moments::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "5000".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use axum::{
        body::Body,
        extract::FromRef,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app() -> (Router, String) {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign("alice").unwrap();
        (build_app(state), token)
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_and_health() {
        let (app, _) = app();
        let res = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], BANNER.as_bytes());

        let res = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn moments_require_a_bearer_token() {
        let (app, _) = app();
        let res = app
            .clone()
            .oneshot(Request::get("/moments").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["error"]["code"], "unauthorized");

        let res = app
            .oneshot(
                Request::get("/moments/total")
                    .header(header::AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_from_other_secret_is_rejected() {
        let (app, _) = app();
        let foreign = JwtKeys::new(b"other", "test-issuer", std::time::Duration::from_secs(60))
            .sign("alice")
            .unwrap();
        let res = app
            .oneshot(
                Request::delete("/moments/1")
                    .header(header::AUTHORIZATION, format!("Bearer {foreign}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn paging_is_validated_before_the_store() {
        let (app, token) = app();
        for query in [
            "current_page=0",
            "page_size=101",
            "current_page=-3",
            "current_page=9223372036854775807&page_size=100",
            "page_size=lots",
        ] {
            let res = app
                .clone()
                .oneshot(
                    Request::get(format!("/moments?{query}"))
                        .header(header::AUTHORIZATION, format!("Bearer {token}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{query}");
            assert_eq!(body_json(res).await["error"]["code"], "validation_error");
        }
    }

    #[tokio::test]
    async fn incomplete_moment_form_is_rejected() {
        let (app, token) = app();
        let body = "--B\r\nContent-Disposition: form-data; name=\"moment-title\"\r\n\r\nOnly title\r\n--B--\r\n";
        let res = app
            .oneshot(
                Request::post("/moments")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "multipart/form-data; boundary=B")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_requests_get_the_json_error_body() {
        let (app, token) = app();
        let res = app
            .clone()
            .oneshot(
                Request::post("/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"]["code"], "validation_error");

        let res = app
            .oneshot(
                Request::get("/moments/first")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn login_with_empty_username_is_rejected() {
        let (app, _) = app();
        let res = app
            .oneshot(
                Request::post("/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"","password":"pw"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
