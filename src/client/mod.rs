//! HTTP access to the panel API over TCP or a Unix socket.
//!
//! [`PanelClient`] performs single-attempt requests bounded by a timeout; retry
//! policy belongs to the scheduler.
mod connector;
mod error;

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

pub use connector::{Endpoint, PanelConnector, PanelStream};
pub use error::{Result, TransportError};

use crate::session::Credential;

/// Fetches an authenticated resource.
pub trait Fetch: Send + Sync {
    /// Performs one `GET` of `path` and returns the body of a 2xx answer.
    fn fetch(
        &self,
        path: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<Bytes>> + Send;
}

#[derive(Clone)]
pub struct PanelClient {
    http: Client<PanelConnector, Full<Bytes>>,
    endpoint: Endpoint,
    timeout: Duration,
}

impl PanelClient {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Self {
        let http = Client::builder(TokioExecutor::new()).build(endpoint.connector());
        Self {
            http,
            endpoint,
            timeout,
        }
    }

    /// Starts a request for `path` with the panel's URL and `Accept: application/json`.
    pub fn request(&self, method: Method, path: &str) -> hyper::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(self.endpoint.url_for(path))
            .header(header::ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// Sends `request` and buffers the whole response, whatever its status.
    pub async fn send(
        &self,
        path: &str,
        request: hyper::http::Result<Request<Full<Bytes>>>,
    ) -> Result<Response<Bytes>> {
        let request = request.map_err(|source| TransportError::Request {
            path: path.to_owned(),
            source,
        })?;
        log::trace!("{} {}", request.method(), request.uri());

        let exchange = async {
            let response =
                self.http
                    .request(request)
                    .await
                    .map_err(|source| TransportError::Send {
                        path: path.to_owned(),
                        source,
                    })?;
            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|source| TransportError::Body {
                    path: path.to_owned(),
                    source,
                })?
                .to_bytes();
            Ok(Response::from_parts(parts, body))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout {
                path: path.to_owned(),
                timeout: self.timeout,
            })?
    }
}

impl Fetch for PanelClient {
    async fn fetch(&self, path: &str, credential: &Credential) -> Result<Bytes> {
        let (name, value) = credential.secret().header();
        let request = self
            .request(Method::GET, path)
            .header(name, value)
            .body(Full::new(Bytes::new()));
        let response = self.send(path, request).await?;
        if !response.status().is_success() {
            return Err(TransportError::Status {
                path: path.to_owned(),
                status: response.status(),
            });
        }
        Ok(response.into_body())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use super::Endpoint;

    /// Serves `router` on an ephemeral localhost port.
    pub async fn serve_tcp(router: axum::Router) -> Endpoint {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        Endpoint::Tcp {
            base_url: format!("http://{addr}"),
        }
    }

    /// Serves `router` on a Unix socket at `path`.
    pub async fn serve_unix(router: axum::Router, path: &Path) -> Endpoint {
        let listener = tokio::net::UnixListener::bind(path).unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        Endpoint::Unix {
            path: path.to_path_buf(),
        }
    }
}
