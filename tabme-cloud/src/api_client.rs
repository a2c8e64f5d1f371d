//! HTTP client for the hosted document (gist) API.
//!
//! Holds the bearer token for the active session and wraps the handful of
//! endpoints the backup protocol needs: identity check, list, get, create,
//! update, and raw content download. Uses reqwest with JSON bodies.

use crate::config::CloudConfig;
use crate::error::{CloudError, CloudResult};
use crate::types::*;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";

/// State shared across API client clones.
#[derive(Default)]
struct AuthState {
    token: Option<String>,
}

/// HTTP client for the gist REST API.
#[derive(Clone)]
pub struct GistApiClient {
    client: Client,
    config: CloudConfig,
    auth: Arc<RwLock<AuthState>>,
}

impl GistApiClient {
    pub fn new(config: CloudConfig) -> CloudResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_str(&config.api_version)
                .map_err(|e| CloudError::Config(format!("invalid api_version: {e}")))?,
        );

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| CloudError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            auth: Arc::new(RwLock::new(AuthState::default())),
        })
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// Sets the token directly (verified login or restored session).
    pub async fn set_token(&self, token: String) {
        self.auth.write().await.token = Some(token);
    }

    pub async fn clear_token(&self) {
        self.auth.write().await.token = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.auth.read().await.token.is_some()
    }

    async fn get_token(&self) -> CloudResult<String> {
        self.auth
            .read()
            .await
            .token
            .clone()
            .ok_or(CloudError::Unauthenticated)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    /// Builds a request against the API base carrying the session token.
    async fn authed(&self, method: Method, path: &str) -> CloudResult<RequestBuilder> {
        let token = self.get_token().await?;
        Ok(self
            .client
            .request(method, self.url(path))
            .bearer_auth(token))
    }

    // ── Identity ──

    /// Checks `token` against the identity endpoint without retaining it.
    pub async fn verify_token(&self, token: &str) -> CloudResult<()> {
        let resp = self
            .client
            .get(self.url("/user"))
            .bearer_auth(token)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            debug!("identity check accepted token");
            return Ok(());
        }

        debug!("identity check rejected token with {status}");
        Err(CloudError::InvalidCredential(format!(
            "identity check returned {status}"
        )))
    }

    // ── Gists ──

    /// Lists the account's gists in API order, following pagination until a
    /// short page or the configured page cap.
    pub async fn list_gists(&self) -> CloudResult<Vec<Gist>> {
        let mut all = Vec::new();
        for page in 1..=self.config.max_list_pages {
            let batch = self.list_page(page).await?;
            let done = batch.len() < self.config.list_page_size as usize;
            all.extend(batch);
            if done {
                break;
            }
        }
        Ok(all)
    }

    /// Returns the first gist, in list order, whose description matches.
    /// Stops paging as soon as a match is found.
    pub async fn find_by_description(&self, description: &str) -> CloudResult<Option<Gist>> {
        for page in 1..=self.config.max_list_pages {
            let batch = self.list_page(page).await?;
            let short = batch.len() < self.config.list_page_size as usize;
            if let Some(found) = batch.into_iter().find(|g| g.has_description(description)) {
                debug!("found backup gist {} on page {page}", found.id);
                return Ok(Some(found));
            }
            if short {
                break;
            }
        }
        Ok(None)
    }

    async fn list_page(&self, page: u32) -> CloudResult<Vec<Gist>> {
        let resp = self
            .authed(Method::GET, "/gists")
            .await?
            .query(&[
                ("per_page", self.config.list_page_size),
                ("page", page),
            ])
            .send()
            .await?;

        let gists: Vec<Gist> = parse_json(check_status(resp, "list gists").await?).await?;
        debug!("listed {} gists on page {page}", gists.len());
        Ok(gists)
    }

    pub async fn get_gist(&self, gist_id: &str) -> CloudResult<Gist> {
        let resp = self
            .authed(Method::GET, &format!("/gists/{gist_id}"))
            .await?
            .send()
            .await?;

        parse_json(check_status(resp, "get gist").await?).await
    }

    /// Creates a private gist holding a single file.
    pub async fn create_gist(
        &self,
        description: &str,
        filename: &str,
        content: String,
    ) -> CloudResult<Gist> {
        let body = CreateGistRequest {
            description: description.to_string(),
            public: false,
            files: single_file(filename, content),
        };

        let resp = self
            .authed(Method::POST, "/gists")
            .await?
            .json(&body)
            .send()
            .await?;

        let gist: Gist = parse_json(check_status(resp, "create gist").await?).await?;
        debug!("created gist {}", gist.id);
        Ok(gist)
    }

    /// Replaces the content of one file in an existing gist.
    pub async fn update_gist(
        &self,
        gist_id: &str,
        filename: &str,
        content: String,
    ) -> CloudResult<Gist> {
        let body = UpdateGistRequest {
            files: single_file(filename, content),
        };

        let resp = self
            .authed(Method::PATCH, &format!("/gists/{gist_id}"))
            .await?
            .json(&body)
            .send()
            .await?;

        let gist: Gist = parse_json(check_status(resp, "update gist").await?).await?;
        debug!("updated gist {}", gist.id);
        Ok(gist)
    }

    /// Downloads a file body from its raw URL. Raw URLs are capability URLs
    /// on a separate host, so the session token is not sent.
    pub async fn fetch_raw(&self, raw_url: &str) -> CloudResult<String> {
        let resp = self.client.get(raw_url).send().await?;
        let resp = check_status(resp, "fetch raw content").await?;
        Ok(resp.text().await?)
    }
}

fn single_file(filename: &str, content: String) -> HashMap<String, FileContent> {
    let mut files = HashMap::new();
    files.insert(filename.to_string(), FileContent { content });
    files
}

/// Maps 401 to `InvalidCredential` (token revoked since login) and any other
/// non-success status to `Api`.
async fn check_status(resp: Response, what: &str) -> CloudResult<Response> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(CloudError::InvalidCredential(format!(
            "{what}: token rejected ({status})"
        )));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(CloudError::Api(format!("{what} returned {status}: {body}")));
    }
    Ok(resp)
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> CloudResult<T> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
