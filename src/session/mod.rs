//! Panel authentication and the shared credential cache.
mod cache;
mod credential;
mod error;
mod login;

pub use cache::{Authenticator, SessionCache};
pub use credential::{Credential, EXPIRY_SAFETY_MARGIN, Secret};
pub use error::{AuthError, Result};
pub use login::{LoginSettings, PanelAuthenticator};

/// How the panel expects requests to be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AuthScheme {
    /// `Authorization: Bearer` token obtained from a token endpoint.
    Bearer,
    /// Session cookie set by a login endpoint.
    Cookie,
}

impl AuthScheme {
    pub fn default_login_path(self) -> &'static str {
        match self {
            AuthScheme::Bearer => "/api/admin/token",
            AuthScheme::Cookie => "/login",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LoginEncoding {
    Form,
    Json,
}
