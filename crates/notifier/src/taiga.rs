//! Taiga directory lookup for agent avatars.
//!
//! Resolution sequence for an agent that is not cached yet:
//! 1. `POST {api}/auth` with the configured credentials → bearer token
//! 2. `GET {api}/users?project={id}` → project members
//! 3. Exact, case-insensitive match on `username` or `full_name`
//! 4. Rewrite the member's photo URL so it is reachable from outside the LAN
//!
//! Every outcome, including "not found" and failures, is cached for the
//! lifetime of the resolver so each agent costs at most one lookup.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use herald_common::config::TaigaConfig;
use herald_common::error::{HeraldError, HeraldResult};

use crate::avatar::AvatarResolver;

/// Timeout for each directory request.
const DIRECTORY_TIMEOUT_SECS: u64 = 5;

/// Per-process memo of avatar lookups keyed by lowercased agent name.
#[derive(Debug, Default)]
pub struct AvatarCache {
    entries: Mutex<HashMap<String, Option<String>>>,
}

impl AvatarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(None)` is a cached "not found"; `None` means never looked up.
    pub fn get(&self, agent: &str) -> Option<Option<String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&agent.to_lowercase())
            .cloned()
    }

    pub fn insert(&self, agent: &str, avatar: Option<String>) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(agent.to_lowercase(), avatar);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rewrites photo URLs served by an internal Taiga host into public ones.
#[derive(Debug, Clone)]
pub struct UrlRewriter {
    /// e.g. `https://taiga.example.com`
    external_url: String,
    /// e.g. `192.168.1.13:8080`
    internal_host: String,
}

impl UrlRewriter {
    pub fn new(external_url: impl Into<String>, internal_host: impl Into<String>) -> Self {
        let external_url: String = external_url.into();
        Self {
            external_url: external_url.trim_end_matches('/').to_string(),
            internal_host: internal_host.into(),
        }
    }

    /// Rewrite a photo URL:
    /// - `//host/x` → `https://host/x`
    /// - `/x` → `{external_url}/x`
    /// - URLs containing the internal host get the external host, over https
    /// - anything else is returned unchanged
    pub fn rewrite(&self, url: &str) -> String {
        let url = match url.strip_prefix("//") {
            Some(rest) => format!("https://{rest}"),
            None => url.to_string(),
        };

        if url.starts_with('/') {
            return format!("{}{}", self.external_url, url);
        }

        if !self.internal_host.is_empty() && url.contains(&self.internal_host) {
            let without_scheme = strip_scheme(&url);
            let rewritten =
                without_scheme.replace(&self.internal_host, strip_scheme(&self.external_url));
            return format!("https://{rewritten}");
        }

        url
    }
}

fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    auth_token: String,
}

/// A member as returned by the Taiga `/users` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaigaUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub big_photo: Option<String>,
}

impl TaigaUser {
    /// Exact, case-insensitive match against username or full name.
    pub fn matches(&self, agent: &str) -> bool {
        let agent = agent.to_lowercase();
        [&self.username, &self.full_name]
            .into_iter()
            .flatten()
            .any(|name| name.to_lowercase() == agent)
    }

    /// Preferred photo URL: `photo`, then `big_photo`. Empty strings are skipped.
    pub fn photo_url(&self) -> Option<&str> {
        [&self.photo, &self.big_photo]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|url| !url.is_empty())
    }
}

/// Minimal client for the Taiga REST API.
#[derive(Debug, Clone)]
pub struct TaigaClient {
    http: reqwest::Client,
    config: TaigaConfig,
}

impl TaigaClient {
    pub fn new(config: TaigaConfig) -> HeraldResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DIRECTORY_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn has_credentials(&self) -> bool {
        self.config.has_credentials()
    }

    /// Exchange username/password for a bearer token.
    pub async fn authenticate(&self) -> HeraldResult<String> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            return Err(HeraldError::Directory(
                "TAIGA_USERNAME and TAIGA_PASSWORD are not set".to_string(),
            ));
        };

        let response = self
            .http
            .post(format!("{}/auth", self.config.api_url))
            .json(&AuthRequest {
                username,
                password,
                kind: "normal",
            })
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(HeraldError::Directory(format!(
                "authentication returned HTTP {}",
                status.as_u16()
            )));
        }

        let auth: AuthResponse = response.json().await?;
        Ok(auth.auth_token)
    }

    /// List the members of the configured project.
    pub async fn list_users(&self, token: &str) -> HeraldResult<Vec<TaigaUser>> {
        let response = self
            .http
            .get(format!("{}/users", self.config.api_url))
            .bearer_auth(token)
            .query(&[("project", self.config.project_id)])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(HeraldError::Directory(format!(
                "user listing returned HTTP {}",
                status.as_u16()
            )));
        }

        Ok(response.json().await?)
    }
}

/// Avatar resolver backed by the Taiga user directory.
pub struct TaigaAvatarResolver {
    client: TaigaClient,
    rewriter: UrlRewriter,
    cache: AvatarCache,
}

impl TaigaAvatarResolver {
    pub fn new(config: TaigaConfig) -> HeraldResult<Self> {
        let rewriter = UrlRewriter::new(&config.external_url, &config.internal_host);
        Ok(Self {
            client: TaigaClient::new(config)?,
            rewriter,
            cache: AvatarCache::new(),
        })
    }

    pub fn cache(&self) -> &AvatarCache {
        &self.cache
    }

    async fn lookup(&self, agent: &str) -> HeraldResult<Option<String>> {
        let token = self.client.authenticate().await?;
        let users = self.client.list_users(&token).await?;

        Ok(users
            .iter()
            .filter(|user| user.matches(agent))
            .find_map(TaigaUser::photo_url)
            .map(|url| self.rewriter.rewrite(url)))
    }
}

#[async_trait]
impl AvatarResolver for TaigaAvatarResolver {
    async fn resolve(&self, agent: &str) -> Option<String> {
        let key = agent.trim().to_lowercase();
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let avatar = if !self.client.has_credentials() {
            tracing::debug!(agent = %key, "Taiga credentials not configured, skipping avatar lookup");
            None
        } else {
            match self.lookup(&key).await {
                Ok(avatar) => avatar,
                Err(e) => {
                    tracing::warn!(agent = %key, error = %e, "Failed to fetch Taiga avatar");
                    None
                }
            }
        };

        match &avatar {
            Some(url) => tracing::info!(agent = %key, avatar_url = %url, "Using Taiga avatar"),
            None => tracing::info!(agent = %key, "No Taiga avatar found, using default webhook avatar"),
        }

        self.cache.insert(&key, avatar.clone());
        avatar
    }
}
