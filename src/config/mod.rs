//! Resolver configuration.
//!
//! [`ResolverConfig`] collects the knobs that are properties of the
//! deployment rather than of the plugin itself: which discovery strategy to
//! use, the forge endpoints, the repository's default branch, the request
//! timeout, and advisory host-compatibility hints. The per-plugin binding
//! (owner, repo, subfolder, credential) lives on
//! [`PluginIdentity`](crate::manifest::PluginIdentity) instead.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default REST API base of the targeted forge.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default web/download base of the targeted forge.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";

/// How the latest remote version is discovered.
///
/// Both strategies produce the same
/// [`ReleaseDescriptor`](crate::forge::ReleaseDescriptor); they differ only
/// in what they ask the forge for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryStrategy {
    /// Query the forge's formal release endpoint (`releases/latest`) and
    /// take the tag and zipball of the most recent published release.
    #[default]
    ReleaseApi,
    /// Fetch the raw entry file from the default branch and extract its
    /// declared `Version:` header. Supports repositories that never cut
    /// formal releases.
    FileProbe,
}

/// Deployment-level settings for an [`UpdateResolver`](crate::resolver::UpdateResolver).
///
/// # TOML Example
///
/// ```toml
/// strategy = "file-probe"
/// default_branch = "main"
/// request_timeout_secs = 10
/// tested_up_to = "6.6"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Release-discovery strategy.
    #[serde(default)]
    pub strategy: DiscoveryStrategy,

    /// Default branch name of the bound repository. Used both for the
    /// deterministic `<repo>-<branch>` archive-folder guess and for the
    /// file-probe download URL.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// REST API base URL of the forge.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Web base URL of the forge, used for archive downloads and info links.
    #[serde(default = "default_download_base")]
    pub download_base: String,

    /// Bound per-request timeout in seconds. The sole mechanism preventing
    /// a check cycle from blocking indefinitely; there is no retry loop.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Advisory "tested against host version" hint passed through to the
    /// host's update record. Never enforced by this crate.
    #[serde(default)]
    pub tested_up_to: Option<String>,

    /// Advisory minimum host version, likewise pass-through only.
    #[serde(default)]
    pub minimum_host_version: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategy: DiscoveryStrategy::default(),
            default_branch: default_branch(),
            api_base: default_api_base(),
            download_base: default_download_base(),
            request_timeout_secs: default_request_timeout_secs(),
            tested_up_to: None,
            minimum_host_version: None,
        }
    }
}

impl ResolverConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the discovery strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: DiscoveryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Overrides the default branch name.
    #[must_use]
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    /// Overrides the forge API base URL.
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = trim_trailing_slash(base.into());
        self
    }

    /// Overrides the forge web/download base URL.
    #[must_use]
    pub fn with_download_base(mut self, base: impl Into<String>) -> Self {
        self.download_base = trim_trailing_slash(base.into());
        self
    }

    /// The request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn trim_trailing_slash(mut s: String) -> String {
    while s.ends_with('/') {
        s.pop();
    }
    s
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_download_base() -> String {
    DEFAULT_DOWNLOAD_BASE.to_string()
}

/// 10 seconds: long enough for a cold forge API call, short enough that a
/// stalled check cannot hold up a host request cycle.
fn default_request_timeout_secs() -> u64 {
    10
}
