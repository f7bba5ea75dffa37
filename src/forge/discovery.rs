//! Release-discovery strategies.
//!
//! Two ways of learning the latest available version coexist, modeled as
//! implementations of one [`ReleaseSource`] capability:
//!
//! - [`ReleaseApiSource`] expects the repository to publish formal releases
//!   and takes the latest one's tag and zipball.
//! - [`FileProbeSource`] works for repositories that never cut releases: it
//!   fetches the raw entry file from the default branch and reads the
//!   `Version:` header out of it, pointing the host at the branch archive
//!   for download.
//!
//! [`Discovery`] wraps both behind the configured
//! [`DiscoveryStrategy`](crate::config::DiscoveryStrategy) so the resolver
//! holds a single concrete source.

use tracing::debug;

use crate::config::{DiscoveryStrategy, ResolverConfig};
use crate::core::FetchError;
use crate::manifest::{self, PluginIdentity};

use super::{ForgeClient, ReleaseDescriptor};

/// A way of discovering the latest available release of the bound plugin.
///
/// Implementations perform at most one forge round trip and translate the
/// wire response into a [`ReleaseDescriptor`]; they never compare versions
/// or touch the host's update store.
pub trait ReleaseSource {
    /// Fetches a descriptor of the latest remote release.
    fn fetch_latest(
        &self,
        client: &ForgeClient,
        identity: &PluginIdentity,
    ) -> impl Future<Output = Result<ReleaseDescriptor, FetchError>> + Send;
}

/// Release-based discovery over the forge's `releases/latest` endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseApiSource;

impl ReleaseSource for ReleaseApiSource {
    async fn fetch_latest(
        &self,
        client: &ForgeClient,
        identity: &PluginIdentity,
    ) -> Result<ReleaseDescriptor, FetchError> {
        let release = client
            .latest_release(&identity.forge_owner, &identity.forge_repo)
            .await?;
        debug!(tag = %release.tag_name, "release-based discovery found latest release");

        Ok(ReleaseDescriptor {
            tag_or_version: release.tag_name,
            download_url: release.zipball_url,
            html_url: release.html_url,
            published_at: release.published_at,
            notes: release.body,
        })
    }
}

/// File-probe discovery: read the remote entry file's `Version:` header.
#[derive(Debug, Clone)]
pub struct FileProbeSource {
    /// Branch the probe reads from and whose archive is offered for
    /// download.
    pub default_branch: String,
    /// Web base of the forge, for archive and info URLs.
    pub download_base: String,
}

impl FileProbeSource {
    /// Builds the probe from deployment config.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            default_branch: config.default_branch.clone(),
            download_base: config.download_base.trim_end_matches('/').to_string(),
        }
    }

    /// Branch archive URL the host downloads when this strategy reports an
    /// update.
    fn archive_url(&self, identity: &PluginIdentity) -> String {
        format!(
            "{}/{}/{}/archive/refs/heads/{}.zip",
            self.download_base, identity.forge_owner, identity.forge_repo, self.default_branch
        )
    }
}

impl ReleaseSource for FileProbeSource {
    async fn fetch_latest(
        &self,
        client: &ForgeClient,
        identity: &PluginIdentity,
    ) -> Result<ReleaseDescriptor, FetchError> {
        let path = identity.remote_entry_path();
        let content = client
            .file_contents(&identity.forge_owner, &identity.forge_repo, &path)
            .await?;

        let version = manifest::extract_version(&content)
            .ok_or_else(|| FetchError::VersionNotFound { path: path.clone() })?;
        debug!(%version, %path, "file-probe discovery extracted remote version");

        Ok(ReleaseDescriptor {
            tag_or_version: version,
            download_url: self.archive_url(identity),
            html_url: format!(
                "{}/{}/{}",
                self.download_base, identity.forge_owner, identity.forge_repo
            ),
            published_at: None,
            notes: None,
        })
    }
}

/// The configured discovery strategy as a single concrete source.
#[derive(Debug, Clone)]
pub enum Discovery {
    /// Formal-release discovery.
    ReleaseApi(ReleaseApiSource),
    /// Header-probing discovery.
    FileProbe(FileProbeSource),
}

impl Discovery {
    /// Selects the strategy named by the configuration.
    pub fn from_config(config: &ResolverConfig) -> Self {
        match config.strategy {
            DiscoveryStrategy::ReleaseApi => Self::ReleaseApi(ReleaseApiSource),
            DiscoveryStrategy::FileProbe => Self::FileProbe(FileProbeSource::from_config(config)),
        }
    }
}

impl ReleaseSource for Discovery {
    async fn fetch_latest(
        &self,
        client: &ForgeClient,
        identity: &PluginIdentity,
    ) -> Result<ReleaseDescriptor, FetchError> {
        match self {
            Self::ReleaseApi(source) => source.fetch_latest(client, identity).await,
            Self::FileProbe(source) => source.fetch_latest(client, identity).await,
        }
    }
}
