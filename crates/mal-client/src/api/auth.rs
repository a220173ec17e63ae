//! OAuth2 authorization-code flow with PKCE and credential storage.
//!
//! See <https://myanimelist.net/apiconfig/references/authorization>.

use super::client::MalClient;
use super::pkce::{CodeChallengeMethod, PkceChallenge};
use crate::error::{MalError, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;
use url::Url;

/// User tokens. Only a successful exchange or refresh, or
/// [`MalClient::set_credentials`], changes them.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    /// `None` when the expiry is unknown
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// True once the access token has passed its expiry. Unknown expiry counts
    /// as not expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| at <= Utc::now())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &str| if token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Credentials")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    #[allow(dead_code)]
    token_type: String,
    expires_in: i64,
    access_token: String,
    refresh_token: String,
}

impl TokenResponse {
    fn into_credentials(self) -> Credentials {
        Credentials {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Duration::try_seconds(self.expires_in)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl)),
        }
    }
}

/// Client identity, OAuth endpoints, current credentials and the pending
/// PKCE verifier.
pub(crate) struct TokenManager {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    authorize_url: Url,
    token_url: Url,
    challenge_method: CodeChallengeMethod,
    pending: Option<PkceChallenge>,
    pub(crate) credentials: Credentials,
}

impl TokenManager {
    pub(crate) fn new(
        client_id: String,
        client_secret: String,
        redirect_url: String,
        authorize_url: Url,
        token_url: Url,
        challenge_method: CodeChallengeMethod,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_url,
            authorize_url,
            token_url,
            challenge_method,
            pending: None,
            credentials: Credentials::default(),
        }
    }

    /// Whether `url` is the authorize or token endpoint
    pub(crate) fn is_oauth_endpoint(&self, url: &Url) -> bool {
        [&self.authorize_url, &self.token_url]
            .iter()
            .any(|endpoint| endpoint.origin() == url.origin() && endpoint.path() == url.path())
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .field("token_url", &self.token_url.as_str())
            .field("pending_flow", &self.pending.is_some())
            .field("expires_at", &self.credentials.expires_at)
            .finish_non_exhaustive()
    }
}

impl MalClient {
    /// Start the authorization flow and return the URL the user has to visit.
    ///
    /// Generates a new PKCE verifier each time; a verifier from an earlier
    /// call can no longer be exchanged.
    pub fn authorization_url(&mut self) -> Result<Url> {
        let pkce = PkceChallenge::new(self.auth.challenge_method)?;

        let mut url = self.auth.authorize_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.auth.client_id)
                .append_pair("redirect_uri", &self.auth.redirect_url)
                .append_pair("code_challenge", &pkce.challenge);
            if pkce.method != CodeChallengeMethod::Plain {
                query.append_pair("code_challenge_method", pkce.method.as_str());
            }
        }

        self.auth.pending = Some(pkce);
        Ok(url)
    }

    /// Exchange the authorization code received on the redirect URL for tokens.
    pub async fn exchange_code(&mut self, code: &str) -> Result<Credentials> {
        let verifier = self
            .auth
            .pending
            .as_ref()
            .map(|p| p.verifier.clone())
            .ok_or(MalError::MissingVerifier)?;

        let params = vec![
            ("client_id", self.auth.client_id.clone()),
            ("client_secret", self.auth.client_secret.clone()),
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", self.auth.redirect_url.clone()),
            ("code_verifier", verifier),
        ];

        let token_url = self.auth.token_url.to_string();
        let response: TokenResponse = self.execute(Method::POST, &token_url, &params).await?;
        let credentials = response.into_credentials();

        self.auth.pending = None;
        self.auth.credentials = credentials.clone();
        info!(expires_at = ?credentials.expires_at, "Authorization code exchanged");

        Ok(credentials)
    }

    /// Get a new access token with the stored refresh token.
    pub async fn refresh_access_token(&mut self) -> Result<Credentials> {
        let params = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", self.auth.credentials.refresh_token.clone()),
            ("client_id", self.auth.client_id.clone()),
            ("client_secret", self.auth.client_secret.clone()),
        ];

        let token_url = self.auth.token_url.to_string();
        let response: TokenResponse = self.execute(Method::POST, &token_url, &params).await?;
        let credentials = response.into_credentials();

        self.auth.credentials = credentials.clone();
        info!(expires_at = ?credentials.expires_at, "Access token refreshed");

        Ok(credentials)
    }

    /// Copy of the current credentials
    pub fn credentials(&self) -> Credentials {
        self.auth.credentials.clone()
    }

    /// Overwrite the credentials, e.g. with tokens persisted by an earlier session.
    pub fn set_credentials(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) {
        self.auth.credentials = Credentials {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        };
    }

    /// Verifier of the authorization flow in progress, if any
    pub fn pending_verifier(&self) -> Option<&str> {
        self.auth.pending.as_ref().map(|p| p.verifier.as_str())
    }
}
