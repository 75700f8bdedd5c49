use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use base64::Engine;
use tokio::net::ToSocketAddrs;

use crate::metrics::PrometheusSink;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

async fn render_metrics(sink: State<Arc<PrometheusSink>>) -> Response {
    match sink.render() {
        Ok(text) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], text).into_response(),
        Err(err) => {
            log::error!("Failed to render metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics").into_response()
        }
    }
}

/// Username and password accepted by the metrics endpoint.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    fn accepts(&self, authorization: Option<&str>) -> bool {
        let Some(encoded) = authorization.and_then(|value| value.strip_prefix("Basic ")) else {
            return false;
        };
        let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };
        decoded
            .split_once(':')
            .is_some_and(|(user, pass)| user == self.username && pass == self.password)
    }
}

async fn require_basic_auth(auth: State<Arc<BasicAuth>>, req: Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if auth.accepts(authorization) {
        return next.run(req).await;
    }

    log::debug!("Rejected unauthenticated request to {}", req.uri().path());
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(header::WWW_AUTHENTICATE, "Basic realm=\"metrics\"")
        .body(Body::from("Unauthorized"))
        .unwrap_or_else(|_| StatusCode::UNAUTHORIZED.into_response())
}

/// Exposition endpoint serving the sink at `GET /metrics`.
pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub fn new(sink: Arc<PrometheusSink>, auth: Option<BasicAuth>) -> Self {
        let mut router = axum::Router::new()
            .route("/metrics", get(render_metrics))
            .with_state(sink);
        if let Some(auth) = auth {
            router = router.layer(middleware::from_fn_with_state(
                Arc::new(auth),
                require_basic_auth,
            ));
        }
        Self { router }
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("Serving metrics on http://{}/metrics", listener.local_addr()?);
        axum::serve(listener, self.router.into_make_service()).await
    }
}
