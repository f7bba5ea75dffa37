//! Shared fixtures: an on-disk plugin, a stubbed release source, and a
//! recording activation host.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use forge_updater::core::FetchError;
use forge_updater::forge::{ForgeClient, ReleaseDescriptor, ReleaseSource};
use forge_updater::installer::PluginActivator;
use forge_updater::manifest::PluginIdentity;

pub const ENTRY_FILE: &str = "example-tools.php";

/// Writes a plausible plugin tree and returns the entry-file path.
pub fn write_plugin(plugins_dir: &Path, version: &str, subfolder: Option<&str>) -> PathBuf {
    let plugin_dir = plugins_dir.join("example-tools");
    std::fs::create_dir_all(&plugin_dir).unwrap();

    let folder_header = subfolder
        .map(|f| format!(" * Forge Plugin Folder: {f}\n"))
        .unwrap_or_default();
    let content = format!(
        "<?php\n/*\n * Plugin Name: Example Tools\n * Plugin URI: https://example.invalid/tools\n \
         * Description: Adds an example tools page.\n * Version: {version}\n * Author: example\n \
         * Forge Plugin URI: example/myrepo\n{folder_header} * Tested up to: 6.6\n */\n"
    );

    let entry = plugin_dir.join(ENTRY_FILE);
    std::fs::write(&entry, content).unwrap();
    entry
}

/// A release source answering with a fixed descriptor, or failing.
pub struct StubForge {
    descriptor: Option<ReleaseDescriptor>,
}

impl StubForge {
    pub fn with_release(tag: &str) -> Self {
        Self {
            descriptor: Some(ReleaseDescriptor {
                tag_or_version: tag.to_string(),
                download_url: format!(
                    "https://api.forge.invalid/repos/example/myrepo/zipball/{tag}"
                ),
                html_url: "https://forge.invalid/example/myrepo".to_string(),
                published_at: None,
                notes: Some("Fixes things.".to_string()),
            }),
        }
    }

    pub fn unreachable() -> Self {
        Self { descriptor: None }
    }
}

impl ReleaseSource for StubForge {
    async fn fetch_latest(
        &self,
        _client: &ForgeClient,
        _identity: &PluginIdentity,
    ) -> Result<ReleaseDescriptor, FetchError> {
        match &self.descriptor {
            Some(d) => Ok(d.clone()),
            None => Err(FetchError::VersionNotFound {
                path: ENTRY_FILE.to_string(),
            }),
        }
    }
}

/// Activation host remembering which plugins were (re)activated.
pub struct RecordingHost {
    active: bool,
    pub activated: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new(active: bool) -> Self {
        Self {
            active,
            activated: Mutex::new(Vec::new()),
        }
    }
}

impl PluginActivator for RecordingHost {
    fn is_active(&self, _slug: &str) -> bool {
        self.active
    }

    fn activate(&self, slug: &str) -> anyhow::Result<()> {
        self.activated.lock().unwrap().push(slug.to_string());
        Ok(())
    }
}
