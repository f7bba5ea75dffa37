//! Plugin entry-file metadata: header parsing and [`PluginIdentity`].
//!
//! A host plugin declares its metadata in a comment block at the top of its
//! entry file, one `Label: value` pair per line:
//!
//! ```text
//! /*
//!  * Plugin Name: Example Tools
//!  * Plugin URI: https://example.invalid/tools
//!  * Description: Adds an example tools page.
//!  * Version: 1.0.1
//!  * Author: example
//!  * Forge Plugin URI: example/example-tools
//!  * Forge Plugin Folder: plugin
//!  */
//! ```
//!
//! The two `Forge Plugin *` headers bind the plugin to a forge repository
//! (and optionally a subfolder inside it, for monorepo-style hosting). This
//! module only ever reads these headers; nothing in the crate writes them.
//!
//! The same labeled-field format is what file-probe discovery extracts a
//! remote `Version:` from, so [`PluginHeaders::parse`] is reused for both
//! the local entry file and the fetched remote copy.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::core::ConfigError;

/// How much of an entry file is scanned for headers. Matches the common
/// host convention of only reading the first 8 KiB.
const HEADER_SCAN_BYTES: usize = 8192;

/// Header labels recognized in a plugin entry file.
const LABEL_NAME: &str = "Plugin Name";
const LABEL_PLUGIN_URI: &str = "Plugin URI";
const LABEL_DESCRIPTION: &str = "Description";
const LABEL_VERSION: &str = "Version";
const LABEL_AUTHOR: &str = "Author";
const LABEL_AUTHOR_URI: &str = "Author URI";
const LABEL_FORGE_URI: &str = "Forge Plugin URI";
const LABEL_FORGE_FOLDER: &str = "Forge Plugin Folder";
const LABEL_REQUIRES: &str = "Requires at least";
const LABEL_TESTED: &str = "Tested up to";

/// The declared header fields of a plugin entry file.
///
/// Every field is optional at this layer; requiredness is enforced when an
/// identity is derived via [`PluginIdentity::from_headers`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginHeaders {
    /// Human-facing plugin name.
    pub name: Option<String>,
    /// Plugin homepage.
    pub plugin_uri: Option<String>,
    /// Short description shown in plugin listings.
    pub description: Option<String>,
    /// Declared version.
    pub version: Option<String>,
    /// Author attribution.
    pub author: Option<String>,
    /// Author link.
    pub author_uri: Option<String>,
    /// Forge repository binding in `owner/repo` form.
    pub forge_repo: Option<String>,
    /// Subfolder inside the repository holding the plugin, if any.
    pub forge_folder: Option<String>,
    /// Minimum host version the plugin declares support for.
    pub requires: Option<String>,
    /// Highest host version the plugin was tested against.
    pub tested: Option<String>,
}

impl PluginHeaders {
    /// Parses the header block out of entry-file content.
    ///
    /// Only the first 8 KiB are scanned. Unknown labels are ignored; known
    /// labels that never appear stay `None`. Never fails: garbage content
    /// simply produces an empty header set.
    pub fn parse(content: &str) -> Self {
        let head = scan_window(content);
        Self {
            name: header_field(head, LABEL_NAME),
            plugin_uri: header_field(head, LABEL_PLUGIN_URI),
            description: header_field(head, LABEL_DESCRIPTION),
            version: header_field(head, LABEL_VERSION),
            author: header_field(head, LABEL_AUTHOR),
            author_uri: header_field(head, LABEL_AUTHOR_URI),
            forge_repo: header_field(head, LABEL_FORGE_URI),
            forge_folder: header_field(head, LABEL_FORGE_FOLDER),
            requires: header_field(head, LABEL_REQUIRES),
            tested: header_field(head, LABEL_TESTED),
        }
    }
}

/// Extracts a single `Version:`-style labeled field from file content.
///
/// This is the probe pattern used by file-probe discovery against the
/// remote copy of the entry file. Returns the trimmed value of the first
/// matching line, or `None` when the label never appears.
pub fn extract_version(content: &str) -> Option<String> {
    header_field(scan_window(content), LABEL_VERSION)
}

fn scan_window(content: &str) -> &str {
    if content.len() <= HEADER_SCAN_BYTES {
        return content;
    }
    // Cut on a char boundary at or below the window size.
    let mut end = HEADER_SCAN_BYTES;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

fn header_field(content: &str, label: &str) -> Option<String> {
    static CACHE: OnceLock<std::sync::Mutex<std::collections::HashMap<String, Regex>>> =
        OnceLock::new();
    let cache = CACHE.get_or_init(Default::default);

    let regex = {
        let mut map = cache.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(label.to_string())
            .or_insert_with(|| {
                // Leading comment decoration (`*`, `//`, `#`) is tolerated.
                Regex::new(&format!(
                    r"(?mi)^[ \t/*#@-]*{}:[ \t]*(.+?)[ \t]*\r?$",
                    regex::escape(label)
                ))
                .expect("header regex is valid")
            })
            .clone()
    };

    regex
        .captures(content)
        .map(|c| cleanup_header_value(&c[1]))
        .filter(|v| !v.is_empty())
}

/// Strips trailing close-comment decoration from a header value, so
/// single-line blocks like `/* Version: 1.0 */` parse cleanly.
fn cleanup_header_value(value: &str) -> String {
    value.trim().trim_end_matches("*/").trim().to_string()
}

/// The immutable forge binding of one installed plugin.
///
/// Built once at startup from the entry file's headers and never mutated;
/// the [`UpdateResolver`](crate::resolver::UpdateResolver) owns it for its
/// lifetime (one resolver instance per bound plugin).
#[derive(Debug, Clone, PartialEq)]
pub struct PluginIdentity {
    /// Canonical install-directory name of the plugin.
    pub slug: String,
    /// Basename of the plugin entry file (e.g. `example-tools.php`).
    pub entry_file: String,
    /// Version currently installed, as declared in the entry file.
    pub installed_version: String,
    /// Forge account owning the repository.
    pub forge_owner: String,
    /// Repository name on the forge.
    pub forge_repo: String,
    /// Subfolder inside the repository holding the plugin, if any.
    pub subfolder: Option<String>,
    /// Credential for private-repository access, if configured.
    pub access_token: Option<String>,
}

impl PluginIdentity {
    /// Reads a plugin entry file and derives its identity and headers.
    ///
    /// The slug is the entry file's parent directory name (falling back to
    /// the file stem for a bare file). Fails with [`ConfigError`] when the
    /// file is unreadable, declares no version, or carries no usable forge
    /// binding; callers are expected to log at `debug` and leave the plugin
    /// without update support.
    pub fn from_entry_file(path: &Path) -> Result<(Self, PluginHeaders), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::EntryFileUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let headers = PluginHeaders::parse(&content);

        let entry_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let slug = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .or_else(|| path.file_stem().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();

        if headers.version.is_none() {
            return Err(ConfigError::MissingVersionHeader {
                path: path.to_path_buf(),
            });
        }

        let identity = Self::from_headers(slug, entry_file, &headers)?;
        debug!(
            slug = %identity.slug,
            repo = %identity.repo_binding(),
            version = %identity.installed_version,
            "parsed plugin identity"
        );
        Ok((identity, headers))
    }

    /// Builds an identity from already-parsed headers.
    ///
    /// Enforces the presence and `owner/repo` shape of the forge binding.
    pub fn from_headers(
        slug: String,
        entry_file: String,
        headers: &PluginHeaders,
    ) -> Result<Self, ConfigError> {
        let binding = headers
            .forge_repo
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingForgeRepo { slug: slug.clone() })?;

        let (owner, repo) = binding
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'))
            .ok_or_else(|| ConfigError::InvalidForgeRepo {
                value: binding.to_string(),
            })?;

        Ok(Self {
            slug,
            entry_file,
            installed_version: headers.version.clone().unwrap_or_default(),
            forge_owner: owner.to_string(),
            forge_repo: repo.to_string(),
            subfolder: headers
                .forge_folder
                .clone()
                .map(|f| f.trim_matches('/').to_string())
                .filter(|f| !f.is_empty()),
            access_token: None,
        })
    }

    /// Attaches a private-repository credential.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// The `owner/repo` binding as a single string, for logs and URLs.
    pub fn repo_binding(&self) -> String {
        format!("{}/{}", self.forge_owner, self.forge_repo)
    }

    /// Repository-relative path of the entry file, honoring the subfolder.
    pub fn remote_entry_path(&self) -> String {
        match &self.subfolder {
            Some(folder) => format!("{}/{}", folder, self.entry_file),
            None => self.entry_file.clone(),
        }
    }
}
