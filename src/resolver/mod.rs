//! The update resolver: decides whether an update exists and feeds the host.
//!
//! [`UpdateResolver`] owns one plugin's forge binding for its lifetime and
//! exposes the named lifecycle hooks the host collaborator calls:
//!
//! - [`on_check_for_update`](UpdateResolver::on_check_for_update) during the
//!   host's periodic update-check cycle,
//! - [`on_source_selection`](UpdateResolver::on_source_selection) after the
//!   host extracts a downloaded archive,
//! - [`on_post_install`](UpdateResolver::on_post_install) once the host has
//!   placed the new version on disk.
//!
//! None of the hooks ever fails outward. Fetch trouble means "no update";
//! relocation trouble means "keep the host's path". The only state the
//! resolver keeps between calls is a per-cycle cache of the last fetched
//! [`ReleaseDescriptor`], so overlapping hook invocations within one host
//! request do not hit the forge twice.

mod store;

pub use store::{MemoryStore, UpdateStore};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::core::{ConfigError, RelocateError};
use crate::forge::{Discovery, ForgeClient, ReleaseDescriptor, ReleaseSource};
use crate::installer::{self, FileMover, InstallState, PluginActivator};
use crate::manifest::{PluginHeaders, PluginIdentity};
use crate::version::VersionComparator;

/// What the host's update transient stores for one plugin.
///
/// Field names match the host's update-descriptor contract exactly; this
/// struct is handed over serialized (or field-by-field) and never read back
/// for correctness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateRecord {
    /// Install slug of the plugin.
    pub slug: String,
    /// Target version, prefix-stripped (`2.0.0`, never `v2.0.0`).
    pub new_version: String,
    /// Human-facing info URL.
    pub url: String,
    /// Package archive the host downloads, credential attached when one is
    /// configured.
    pub package: String,
    /// Advisory tested-against host version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tested: Option<String>,
    /// Advisory minimum host version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
}

/// Rendered release-notes sections for the host's details view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InfoSections {
    /// Plugin description, from the entry-file headers.
    pub description: Option<String>,
    /// Changelog, from the remote release notes.
    pub changelog: Option<String>,
}

/// The richer "view details" surface for a plugin.
///
/// Populated from the entry-file headers plus the same [`ReleaseDescriptor`]
/// the update check uses. Remote fields are `None` when the forge could not
/// be reached; the host renders best-known state instead of an error.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    /// Human-facing plugin name.
    pub name: String,
    /// Install slug.
    pub slug: String,
    /// Version currently installed.
    pub installed_version: String,
    /// Latest version on the forge, prefix-stripped; `None` when the fetch
    /// failed or the remote version was unusable.
    pub remote_version: Option<String>,
    /// Author attribution.
    pub author: Option<String>,
    /// Author link.
    pub author_url: Option<String>,
    /// Plugin homepage; falls back to the forge repository page.
    pub homepage: Option<String>,
    /// Advisory tested-against host version.
    pub tested: Option<String>,
    /// When the latest release was published, if known.
    pub last_updated: Option<DateTime<Utc>>,
    /// Description and changelog text sections.
    pub sections: InfoSections,
}

/// Orchestrates update discovery for one forge-bound plugin.
///
/// Generic over the [`ReleaseSource`] so tests can substitute a stub;
/// production code uses the [`Discovery`] wrapper chosen by configuration.
pub struct UpdateResolver<S: ReleaseSource = Discovery> {
    identity: PluginIdentity,
    headers: PluginHeaders,
    config: ResolverConfig,
    client: ForgeClient,
    source: S,
    // Per-cycle descriptor cache; cleared by force_refresh. Successful
    // fetches only - a failed cycle stays a failed cycle.
    cached: Mutex<Option<ReleaseDescriptor>>,
}

impl UpdateResolver<Discovery> {
    /// Creates a resolver with the configured discovery strategy.
    ///
    /// Fails with [`ConfigError`] when the identity carries no usable forge
    /// binding or the HTTP client cannot be built; the caller should log at
    /// `debug` and run without update support for this plugin.
    pub fn new(
        identity: PluginIdentity,
        headers: PluginHeaders,
        config: ResolverConfig,
    ) -> Result<Self, ConfigError> {
        let source = Discovery::from_config(&config);
        Self::with_source(identity, headers, config, source)
    }
}

impl<S: ReleaseSource> UpdateResolver<S> {
    /// Creates a resolver around an explicit release source.
    pub fn with_source(
        identity: PluginIdentity,
        headers: PluginHeaders,
        config: ResolverConfig,
        source: S,
    ) -> Result<Self, ConfigError> {
        if identity.forge_owner.is_empty() || identity.forge_repo.is_empty() {
            return Err(ConfigError::MissingForgeRepo {
                slug: identity.slug.clone(),
            });
        }
        let client = ForgeClient::new(&config, identity.access_token.as_deref())?;

        Ok(Self {
            identity,
            headers,
            config,
            client,
            source,
            cached: Mutex::new(None),
        })
    }

    /// The plugin this resolver is bound to.
    pub fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    /// Fetches the remote descriptor, reusing this cycle's cached copy.
    async fn descriptor(&self) -> Result<ReleaseDescriptor, crate::core::FetchError> {
        let mut cached = self.cached.lock().await;
        if let Some(descriptor) = cached.as_ref() {
            return Ok(descriptor.clone());
        }
        let descriptor = self.source.fetch_latest(&self.client, &self.identity).await?;
        *cached = Some(descriptor.clone());
        Ok(descriptor)
    }

    /// The core decision: is there an update, and what should the host be
    /// told about it?
    ///
    /// Returns `None` on any fetch trouble (fail closed), on a malformed
    /// remote version, and when the remote is not strictly newer. When a
    /// credential is configured it is appended to the package URL as a
    /// query parameter so the host's unauthenticated downloader can reach a
    /// private repository.
    pub async fn check_for_update(&self) -> Option<UpdateRecord> {
        let descriptor = match self.descriptor().await {
            Ok(d) => d,
            Err(e) => {
                debug!(
                    slug = %self.identity.slug,
                    error = %e,
                    "update check failed; treating as no update"
                );
                return None;
            }
        };

        let Some(remote) = VersionComparator::normalize(&descriptor.tag_or_version) else {
            debug!(
                slug = %self.identity.slug,
                tag = %descriptor.tag_or_version,
                "remote version is malformed; treating as no update"
            );
            return None;
        };

        if !VersionComparator::is_newer(&self.identity.installed_version, &descriptor.tag_or_version)
        {
            debug!(
                slug = %self.identity.slug,
                installed = %self.identity.installed_version,
                remote,
                "installed version is current"
            );
            return None;
        }

        Some(UpdateRecord {
            slug: self.identity.slug.clone(),
            new_version: remote.to_string(),
            url: descriptor.html_url.clone(),
            package: self.package_url(&descriptor.download_url),
            tested: self
                .headers
                .tested
                .clone()
                .or_else(|| self.config.tested_up_to.clone()),
            requires: self
                .headers
                .requires
                .clone()
                .or_else(|| self.config.minimum_host_version.clone()),
        })
    }

    /// Host hook: one update-check cycle.
    ///
    /// Skips all work while the store is unprimed (the host has not begun a
    /// real check cycle). Otherwise stores the fresh record under this
    /// plugin's slug, or removes the entry so a previously advertised
    /// update never outlives a remote rollback. Never fails outward.
    pub async fn on_check_for_update(&self, store: &mut dyn UpdateStore) {
        if !store.is_primed() {
            debug!(slug = %self.identity.slug, "update transient not primed; skipping check");
            return;
        }

        match self.check_for_update().await {
            Some(record) => {
                info!(
                    slug = %self.identity.slug,
                    installed = %self.identity.installed_version,
                    available = %record.new_version,
                    "update available"
                );
                store.set(&self.identity.slug, record);
            }
            None => store.remove(&self.identity.slug),
        }
    }

    /// The richer details surface, from headers plus the remote descriptor.
    ///
    /// Never fails: when the forge is unreachable the remote fields are
    /// simply absent and the host shows best-known state.
    pub async fn describe_plugin(&self) -> PluginInfo {
        let descriptor = match self.descriptor().await {
            Ok(d) => Some(d),
            Err(e) => {
                debug!(slug = %self.identity.slug, error = %e, "describe: remote state unavailable");
                None
            }
        };

        PluginInfo {
            name: self
                .headers
                .name
                .clone()
                .unwrap_or_else(|| self.identity.slug.clone()),
            slug: self.identity.slug.clone(),
            installed_version: self.identity.installed_version.clone(),
            remote_version: descriptor.as_ref().and_then(|d| {
                VersionComparator::normalize(&d.tag_or_version).map(str::to_string)
            }),
            author: self.headers.author.clone(),
            author_url: self.headers.author_uri.clone(),
            homepage: self
                .headers
                .plugin_uri
                .clone()
                .or_else(|| descriptor.as_ref().map(|d| d.html_url.clone())),
            tested: self
                .headers
                .tested
                .clone()
                .or_else(|| self.config.tested_up_to.clone()),
            last_updated: descriptor.as_ref().and_then(|d| d.published_at),
            sections: InfoSections {
                description: self.headers.description.clone(),
                changelog: descriptor.and_then(|d| d.notes),
            },
        }
    }

    /// Host hook: repair the extracted archive's layout.
    ///
    /// `source` is the directory the host already chose; `remote_root` is
    /// the root the archive was extracted into. Returns the corrected plugin
    /// directory, or the host's own `source` unchanged when no recognizable
    /// layout was found (best effort, the install proceeds either way).
    pub fn on_source_selection(&self, source: &Path, remote_root: &Path) -> PathBuf {
        match installer::resolve_source(remote_root, &self.identity, &self.config.default_branch) {
            Ok(corrected) => {
                info!(
                    slug = %self.identity.slug,
                    from = %source.display(),
                    to = %corrected.display(),
                    "corrected extracted archive layout"
                );
                corrected
            }
            Err(e) => {
                warn!(
                    slug = %self.identity.slug,
                    error = %e,
                    "archive layout fix failed; keeping host-selected source"
                );
                source.to_path_buf()
            }
        }
    }

    /// Captures the plugin's activation state before any filesystem
    /// mutation of the install begins.
    ///
    /// Must be called before the host starts replacing files; the returned
    /// state is what [`on_post_install`](Self::on_post_install) consults,
    /// never a post-hoc inference.
    pub fn capture_install_state(&self, host: &dyn PluginActivator) -> InstallState {
        InstallState::capture(host, &self.identity.slug)
    }

    /// Host hook: after install, rename the destination to the exact slug
    /// and reactivate when the plugin was active before the update.
    ///
    /// A failed rename is returned as [`RelocateError`] for the host's own
    /// installer failure path; a failed reactivation is only logged.
    pub fn on_post_install(
        &self,
        state: InstallState,
        installed_path: &Path,
        mover: &dyn FileMover,
        host: &dyn PluginActivator,
    ) -> Result<PathBuf, RelocateError> {
        let destination = installer::finalize_destination(installed_path, &self.identity, mover)?;

        if state.was_active() {
            if let Err(e) = host.activate(&self.identity.slug) {
                warn!(slug = %self.identity.slug, error = %e, "failed to reactivate plugin");
            } else {
                info!(slug = %self.identity.slug, "plugin reactivated after update");
            }
        }

        Ok(destination)
    }

    /// Operator-facing "force check" trigger.
    ///
    /// Clears this resolver's per-cycle descriptor cache and invalidates
    /// the store's checked state so the host's next natural cycle re-queries
    /// the forge immediately. Deliberately does not re-query inline.
    pub async fn force_refresh(&self, store: &mut dyn UpdateStore) {
        self.cached.lock().await.take();
        store.invalidate();
        info!(slug = %self.identity.slug, "forced refresh; next cycle will re-query the forge");
    }

    fn package_url(&self, download_url: &str) -> String {
        match &self.identity.access_token {
            Some(token) => {
                let separator = if download_url.contains('?') { '&' } else { '?' };
                format!("{download_url}{separator}access_token={token}")
            }
            None => download_url.to_string(),
        }
    }
}
