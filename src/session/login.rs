use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Response};
use jiff::{SignedDuration, Timestamp};

use super::cache::Authenticator;
use super::credential::parse_set_cookie;
use super::{AuthError, AuthScheme, Credential, LoginEncoding, Result, Secret};
use crate::client::PanelClient;

/// How to log in to the panel.
#[derive(Debug, Clone)]
pub struct LoginSettings {
    pub scheme: AuthScheme,
    pub path: String,
    pub encoding: LoginEncoding,
    pub username: String,
    pub password: String,
    /// Cookie carrying the session for [`AuthScheme::Cookie`].
    pub cookie_name: String,
    /// Upper bound for reusing a credential.
    pub ttl: Duration,
}

#[derive(serde::Serialize)]
struct LoginForm<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(serde::Deserialize)]
struct LoginResponse {
    success: bool,
    #[serde(default)]
    msg: String,
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    detail: Option<serde_json::Value>,
    msg: Option<String>,
}

/// [`Authenticator`] talking to the panel's login endpoint.
#[derive(Clone)]
pub struct PanelAuthenticator {
    client: PanelClient,
    settings: LoginSettings,
}

impl PanelAuthenticator {
    pub fn new(client: PanelClient, settings: LoginSettings) -> Self {
        Self { client, settings }
    }

    fn encode_form(&self) -> Result<(&'static str, String)> {
        let form = LoginForm {
            username: &self.settings.username,
            password: &self.settings.password,
        };
        match self.settings.encoding {
            LoginEncoding::Form => serde_urlencoded::to_string(&form)
                .map(|body| ("application/x-www-form-urlencoded", body))
                .map_err(|err| AuthError::Encode(err.to_string())),
            LoginEncoding::Json => serde_json::to_string(&form)
                .map(|body| ("application/json", body))
                .map_err(|err| AuthError::Encode(err.to_string())),
        }
    }

    fn bearer(&self, body: &[u8], issued_at: Timestamp) -> Result<Credential> {
        let token: TokenResponse = serde_json::from_slice(body).map_err(AuthError::Decode)?;
        if token.access_token.is_empty() {
            return Err(AuthError::MissingCredential("access_token".to_owned()));
        }
        let stated_expiry = token
            .expires_in
            .and_then(|secs| issued_at.checked_add(SignedDuration::from_secs(secs)).ok());
        Ok(Credential::issue(
            Secret::Bearer(token.access_token),
            issued_at,
            self.settings.ttl,
            stated_expiry,
        ))
    }

    fn cookie(&self, response: &Response<Bytes>, issued_at: Timestamp) -> Result<Credential> {
        let login: LoginResponse =
            serde_json::from_slice(response.body()).map_err(AuthError::Decode)?;
        if !login.success {
            return Err(AuthError::Rejected(login.msg));
        }

        let name = &self.settings.cookie_name;
        let (value, stated_expiry) = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| parse_set_cookie(value, name, issued_at))
            .last()
            .ok_or_else(|| AuthError::MissingCredential(name.clone()))?;
        Ok(Credential::issue(
            Secret::Cookie {
                name: name.clone(),
                value,
            },
            issued_at,
            self.settings.ttl,
            stated_expiry,
        ))
    }
}

impl Authenticator for PanelAuthenticator {
    async fn login(&self) -> Result<Credential> {
        let (content_type, body) = self.encode_form()?;
        let path = self.settings.path.as_str();
        let request = self
            .client
            .request(Method::POST, path)
            .header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
            .body(Full::new(Bytes::from(body)));

        let issued_at = Timestamp::now();
        let response = self.client.send(path, request).await?;
        if !response.status().is_success() {
            return Err(AuthError::Status {
                status: response.status(),
                message: upstream_message(response.body()),
            });
        }

        match self.settings.scheme {
            AuthScheme::Bearer => self.bearer(response.body(), issued_at),
            AuthScheme::Cookie => self.cookie(&response, issued_at),
        }
    }
}

/// Best-effort human readable reason from an error body.
fn upstream_message(body: &[u8]) -> String {
    if let Ok(err) = serde_json::from_slice::<ErrorResponse>(body) {
        match (err.detail, err.msg) {
            (Some(serde_json::Value::String(detail)), _) => return detail,
            (Some(detail), _) => return detail.to_string(),
            (None, Some(msg)) => return msg,
            (None, None) => {}
        }
    }
    String::from_utf8_lossy(body).chars().take(200).collect()
}
