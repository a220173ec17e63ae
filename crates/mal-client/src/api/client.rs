//! MyAnimeList API v2 client: construction and the shared request path.
//!
//! Every call the client makes, resource queries, page following and token
//! requests alike, goes through [`MalClient::execute`], so they all share one
//! auth-header rule and one failure model.

use super::auth::TokenManager;
use super::paging::{rewrite_limit, Direction, Paging};
use super::pkce::CodeChallengeMethod;
use crate::error::{ErrorEnvelope, MalError, Result};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default API entry point
pub const API_ENDPOINT: &str = "https://api.myanimelist.net/v2/";
/// OAuth2 authorization page the user is sent to
pub const AUTHORIZE_ENDPOINT: &str = "https://myanimelist.net/v1/oauth2/authorize";
/// OAuth2 token endpoint
pub const TOKEN_ENDPOINT: &str = "https://myanimelist.net/v1/oauth2/token";
/// Request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Query or form parameters of a request
pub type Params = Vec<(&'static str, String)>;

/// Data needed to construct a [`MalClient`].
///
/// `client_id`, `client_secret` and `redirect_url` are required. Use `"/"` as
/// redirect URL when tokens will be set with [`MalClient::set_credentials`]
/// instead of running the authorization flow.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    /// Per-request timeout, [`DEFAULT_TIMEOUT`] when unset
    pub timeout: Option<Duration>,
    /// Replaces the internally built HTTP client
    pub http_client: Option<Client>,
    pub api_base: Option<String>,
    pub authorize_url: Option<String>,
    pub token_url: Option<String>,
    pub challenge_method: CodeChallengeMethod,
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Point the client at another API base, e.g. a local mock server
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = Some(url.into());
        self
    }

    pub fn with_oauth_endpoints(
        mut self,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.authorize_url = Some(authorize_url.into());
        self.token_url = Some(token_url.into());
        self
    }

    pub fn with_challenge_method(mut self, method: CodeChallengeMethod) -> Self {
        self.challenge_method = method;
        self
    }
}

/// Raw response: status plus the fully read body
struct RawResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl RawResponse {
    /// Decode the error envelope of a non-200 response
    fn into_error(self) -> MalError {
        match serde_json::from_slice::<ErrorEnvelope>(&self.body) {
            Ok(envelope) => MalError::Api(envelope.into_api_error(self.status.as_u16())),
            Err(e) => MalError::Decode(e),
        }
    }
}

/// MyAnimeList API v2 client
#[derive(Debug)]
pub struct MalClient {
    /// HTTP client
    http: Client,
    /// Base URL relative paths are resolved against
    base_url: Url,
    /// Set only when a custom HTTP client is combined with an explicit timeout
    request_timeout: Option<Duration>,
    /// Credentials and PKCE state
    pub(crate) auth: TokenManager,
}

impl MalClient {
    /// Create a new client. Fails before any network activity when a required
    /// field is missing.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.client_id.is_empty() {
            return Err(MalError::Config("field client_id is required".to_string()));
        }
        if config.client_secret.is_empty() {
            return Err(MalError::Config("field client_secret is required".to_string()));
        }
        if config.redirect_url.is_empty() {
            return Err(MalError::Config("field redirect_url is required".to_string()));
        }

        let base_url = parse_base(config.api_base.as_deref().unwrap_or(API_ENDPOINT))?;
        let authorize_url = parse_endpoint(
            config.authorize_url.as_deref().unwrap_or(AUTHORIZE_ENDPOINT),
            "authorize_url",
        )?;
        let token_url = parse_endpoint(
            config.token_url.as_deref().unwrap_or(TOKEN_ENDPOINT),
            "token_url",
        )?;

        let (http, request_timeout) = match config.http_client {
            Some(client) => (client, config.timeout),
            None => {
                let client = Client::builder()
                    .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT))
                    .user_agent(concat!("mal-client/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .map_err(|e| MalError::Config(format!("Failed to create HTTP client: {}", e)))?;
                (client, None)
            }
        };

        Ok(Self {
            http,
            base_url,
            request_timeout,
            auth: TokenManager::new(
                config.client_id,
                config.client_secret,
                config.redirect_url,
                authorize_url,
                token_url,
                config.challenge_method,
            ),
        })
    }

    /// Base URL relative request paths are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue one request and decode the response.
    ///
    /// `path` is resolved against the API base; absolute URLs are used as is.
    /// GET parameters go to the query string, any other method sends them as a
    /// form-urlencoded body. HTTP 200 decodes into `T`; any other status decodes
    /// the `{error, message}` envelope into [`MalError::Api`].
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let raw = self.send(method, path, params).await?;
        if raw.status == StatusCode::OK {
            Ok(serde_json::from_slice(&raw.body)?)
        } else {
            Err(raw.into_error())
        }
    }

    /// Same request path as [`execute`](Self::execute) for endpoints with no
    /// meaningful body. Statuses listed in `accept` count as success.
    pub(crate) async fn execute_empty(
        &self,
        method: Method,
        path: &str,
        accept: &[StatusCode],
    ) -> Result<StatusCode> {
        let raw = self.send(method, path, &[]).await?;
        if accept.contains(&raw.status) {
            Ok(raw.status)
        } else {
            Err(raw.into_error())
        }
    }

    /// Fetch the page a cursor points to.
    ///
    /// Fails with [`MalError::NoMorePages`] without touching the network when
    /// the cursor has no URL in that direction. A positive `limit` replaces the
    /// page size carried by the cursor URL.
    pub async fn follow_page<T: DeserializeOwned>(
        &self,
        paging: &Paging,
        direction: Direction,
        limit: Option<u32>,
    ) -> Result<T> {
        let page_url = paging.url(direction).ok_or(MalError::NoMorePages)?;

        let page_url = match limit.filter(|l| *l > 0) {
            Some(limit) => rewrite_limit(page_url, limit)?,
            None => page_url.to_string(),
        };

        self.execute(Method::GET, &page_url, &[]).await
    }

    async fn send(&self, method: Method, path: &str, params: &[(&str, String)]) -> Result<RawResponse> {
        let mut url = self.base_url.join(path)?;

        if method == Method::GET && !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }

        debug!(method = %method, url = %url, "Making API request");

        let mut request = self.http.request(method.clone(), url.clone());

        // Token and authorize endpoints authenticate with client id/secret
        if !self.auth.is_oauth_endpoint(&url) {
            request = request.bearer_auth(&self.auth.credentials.access_token);
        }

        if method != Method::GET {
            request = request.form(params);
        }

        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        debug!(method = %method, url = %url, status = %status, "Request finished");

        Ok(RawResponse { status, body })
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    // Url::join drops the last segment unless the base ends with '/'
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| MalError::Config(format!("invalid api_base `{}`: {}", raw, e)))
}

fn parse_endpoint(raw: &str, field: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| MalError::Config(format!("invalid {} `{}`: {}", field, raw, e)))
}
