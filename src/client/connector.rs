use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{self, Context, Poll};

use hyper::Uri;
use hyper::rt::{Read, ReadBufCursor, Write};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder, MaybeHttpsStream};
use hyper_util::client::legacy::connect::{Connected, Connection, HttpConnector};
use hyper_util::rt::TokioIo;
use tower::Service;

/// Where the panel API is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `http://` or `https://` base URL without a trailing slash, e.g. `http://127.0.0.1:8000`.
    Tcp { base_url: String },
    Unix { path: PathBuf },
}

impl Endpoint {
    /// Absolute URL of `path`; over a Unix socket the host part is a placeholder.
    pub fn url_for(&self, path: &str) -> String {
        match self {
            Endpoint::Tcp { base_url } => format!("{base_url}{path}"),
            Endpoint::Unix { .. } => format!("http://localhost{path}"),
        }
    }

    pub(crate) fn connector(&self) -> PanelConnector {
        match self {
            Endpoint::Tcp { .. } => {
                let mut http = HttpConnector::new();
                http.enforce_http(false);
                let https = HttpsConnectorBuilder::new()
                    .with_webpki_roots()
                    .https_or_http()
                    .enable_http1()
                    .wrap_connector(http);
                PanelConnector::Tcp(https)
            }
            Endpoint::Unix { path } => PanelConnector::Unix(path.clone()),
        }
    }
}

/// Dials TCP (with TLS for `https` URIs) or the configured Unix socket,
/// ignoring the URI's authority in the latter case.
#[derive(Debug, Clone)]
pub enum PanelConnector {
    Tcp(HttpsConnector<HttpConnector>),
    Unix(PathBuf),
}

impl Service<Uri> for PanelConnector {
    type Response = PanelStream;

    type Error = io::Error;

    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        match self {
            PanelConnector::Tcp(https) => {
                let mut https = https.clone();
                Box::pin(async move {
                    let stream = https.call(uri).await.map_err(io::Error::other)?;
                    Ok(PanelStream::Tcp(stream))
                })
            }
            PanelConnector::Unix(path) => {
                let path = path.clone();
                Box::pin(async move {
                    log::trace!("Connecting to {}", path.display());
                    let stream = tokio::net::UnixStream::connect(path).await?;
                    Ok(PanelStream::Unix(TokioIo::new(stream)))
                })
            }
        }
    }
}

pub enum PanelStream {
    Tcp(MaybeHttpsStream<TokioIo<tokio::net::TcpStream>>),
    Unix(TokioIo<tokio::net::UnixStream>),
}

impl Connection for PanelStream {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}

impl Read for PanelStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            PanelStream::Tcp(stream) => Pin::new(stream).poll_read(cx, buf),
            PanelStream::Unix(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl Write for PanelStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            PanelStream::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),
            PanelStream::Unix(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            PanelStream::Tcp(stream) => Pin::new(stream).poll_flush(cx),
            PanelStream::Unix(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            PanelStream::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),
            PanelStream::Unix(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let tcp = Endpoint::Tcp {
            base_url: "http://127.0.0.1:8000".to_owned(),
        };
        assert_eq!(
            tcp.url_for("/api/users?limit=250&offset=0"),
            "http://127.0.0.1:8000/api/users?limit=250&offset=0"
        );

        let unix = Endpoint::Unix {
            path: PathBuf::from("/run/panel.sock"),
        };
        assert_eq!(unix.url_for("/api/nodes"), "http://localhost/api/nodes");
    }
}
