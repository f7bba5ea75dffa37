//! Forge REST API client.
//!
//! [`ForgeClient`] issues authenticated GET requests against the forge's
//! REST API and decodes the two resources this crate consumes:
//!
//! - `GET /repos/{owner}/{repo}/releases/latest` → [`LatestRelease`]
//! - `GET /repos/{owner}/{repo}/contents/{path}` → raw file text (base64
//!   `content` field, decoded here)
//!
//! The raw wire structs never leave this module's boundary undigested: the
//! discovery layer ([`discovery`]) converts them into [`ReleaseDescriptor`],
//! the only shape the resolver sees.
//!
//! # Failure Model
//!
//! Transport errors, non-2xx statuses, and undecodable bodies all become
//! [`FetchError`]. Callers must not distinguish between them; any fetch
//! trouble means "no update available" this cycle.

pub mod discovery;

pub use discovery::{Discovery, FileProbeSource, ReleaseApiSource, ReleaseSource};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::core::{ConfigError, FetchError};

/// User agent sent with every forge request. Forges commonly reject
/// anonymous clients outright.
pub const USER_AGENT: &str = concat!("forge-updater/", env!("CARGO_PKG_VERSION"));

/// Wire shape of the forge's latest-release endpoint.
///
/// Only the fields this crate consumes are decoded; everything else in the
/// response is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestRelease {
    /// Release tag, possibly carrying a naming prefix (`v2.0.0`).
    pub tag_name: String,
    /// Source zipball for the tagged commit.
    pub zipball_url: String,
    /// Human-facing release page.
    pub html_url: String,
    /// Free-text release notes.
    #[serde(default)]
    pub body: Option<String>,
    /// Publication timestamp.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Wire shape of the forge's file-contents endpoint.
#[derive(Debug, Deserialize)]
struct ContentsFile {
    /// File payload, base64 with embedded newlines by convention.
    #[serde(default)]
    content: Option<String>,
    /// Payload encoding; anything but `base64` is passed through raw.
    #[serde(default)]
    encoding: Option<String>,
}

/// The latest available release of the bound plugin, as reported by one of
/// the discovery strategies.
///
/// Transient: fetched fresh each check cycle and cached at most for the
/// duration of one cycle inside the resolver. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseDescriptor {
    /// Version or tag, possibly prefixed (`v2.0.0`); the resolver strips
    /// the prefix before comparison.
    pub tag_or_version: String,
    /// Archive the host should download and install.
    pub download_url: String,
    /// Human-facing page for "view details" links.
    pub html_url: String,
    /// When the release was published, if the strategy knows.
    pub published_at: Option<DateTime<Utc>>,
    /// Free-text release notes, if the strategy has them.
    pub notes: Option<String>,
}

/// Authenticated HTTP client for the forge REST API.
///
/// Carries the bounded request timeout and, when a credential is
/// configured, attaches it as a token header for private-repository
/// access. One instance per resolver; cheap to construct, no connection is
/// opened until the first request.
pub struct ForgeClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl ForgeClient {
    /// Builds a client from deployment config and an optional credential.
    pub fn new(config: &ResolverConfig, token: Option<&str>) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
        })
    }

    /// Fetches the most recent published release of a repository.
    pub async fn latest_release(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<LatestRelease, FetchError> {
        let url = format!("{}/repos/{}/{}/releases/latest", self.api_base, owner, repo);
        self.get_json(&url).await
    }

    /// Fetches the decoded text of a single file from the default branch.
    ///
    /// The contents endpoint wraps file text in base64; the decode is
    /// whitespace-tolerant because the forge inserts line breaks. A payload
    /// with an unexpected encoding is passed through as-is, and a missing
    /// payload (e.g. the path is a directory) is a [`FetchError::Decode`].
    pub async fn file_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            owner,
            repo,
            path.trim_start_matches('/')
        );
        let file: ContentsFile = self.get_json(&url).await?;
        decode_contents(&url, file)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(%url, "forge GET");

        let mut request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

fn decode_contents(url: &str, file: ContentsFile) -> Result<String, FetchError> {
    let content = file.content.ok_or_else(|| FetchError::Decode {
        url: url.to_string(),
        reason: "response carries no content field".to_string(),
    })?;

    match file.encoding.as_deref() {
        None | Some("base64") => {
            let compact: String = content.split_whitespace().collect();
            let bytes = BASE64.decode(compact).map_err(|e| FetchError::Decode {
                url: url.to_string(),
                reason: format!("invalid base64 content: {e}"),
            })?;
            String::from_utf8(bytes).map_err(|e| FetchError::Decode {
                url: url.to_string(),
                reason: format!("content is not UTF-8: {e}"),
            })
        }
        Some(_) => Ok(content),
    }
}
