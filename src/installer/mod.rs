//! Archive layout fixing and post-install relocation.
//!
//! Forge archive downloads unpack into a single top-level directory named
//! `<repo>-<branch-or-tag>`, which never matches the slug directory the
//! host expects, and the plugin may additionally live in a configured
//! subfolder of the repository (monorepo-style hosting). This module
//! resolves both mismatches:
//!
//! - [`resolve_source`] finds the real plugin directory inside a freshly
//!   extracted archive, preferring the deterministic `<repo>-<branch>`
//!   guess and falling back to enumerating the extracted root's children.
//! - [`finalize_destination`] renames the host-placed install directory to
//!   the exact plugin slug, for hosts whose installer derives a different
//!   destination name.
//!
//! Both are best-effort by contract: a [`RelocateError`] must be treated as
//! "proceed with the host's default behavior", never as a reason to abort
//! the install. Filesystem moves are assumed atomic-enough at the
//! directory-rename granularity of the injected [`FileMover`]; there is no
//! transactional rollback here.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::RelocateError;
use crate::manifest::PluginIdentity;
use crate::utils::fs as fsutil;

/// The host's filesystem-move primitive, injected so hosts can route moves
/// through their own filesystem abstraction.
///
/// `move_dir` must replace an existing destination directory, and is
/// expected to be atomic at directory-rename granularity for same-device
/// moves.
pub trait FileMover {
    /// Moves (renames) a directory, replacing the destination if present.
    fn move_dir(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Direct-filesystem [`FileMover`], with a copy-and-remove fallback for
/// cross-device moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileMover;

impl FileMover for StdFileMover {
    fn move_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        fsutil::move_dir(from, to)
    }
}

/// Host collaborator for plugin activation state.
pub trait PluginActivator {
    /// Whether the plugin is currently active in the host.
    fn is_active(&self, slug: &str) -> bool;

    /// Activates the plugin.
    fn activate(&self, slug: &str) -> anyhow::Result<()>;
}

/// Activation state captured before an install mutates the filesystem.
///
/// Obtained via
/// [`UpdateResolver::capture_install_state`](crate::resolver::UpdateResolver::capture_install_state);
/// deliberately not constructible from a post-install guess.
#[derive(Debug, Clone, Copy)]
pub struct InstallState {
    was_active: bool,
}

impl InstallState {
    pub(crate) fn capture(host: &dyn PluginActivator, slug: &str) -> Self {
        Self {
            was_active: host.is_active(slug),
        }
    }

    /// Whether the plugin was active when the state was captured.
    pub fn was_active(&self) -> bool {
        self.was_active
    }
}

/// Locates the plugin directory inside an extracted archive.
///
/// Strategy, in order of preference:
///
/// 1. The deterministic guess `<repo>-<default_branch>`, plus the
///    configured subfolder if any. Returned directly when it exists.
/// 2. Enumeration of the extracted root's immediate child directories (in
///    sorted order, so the result is stable): with a subfolder configured,
///    the first child containing it wins; without one, the first child
///    containing the plugin's entry file wins.
///
/// When neither strategy matches, [`RelocateError::LayoutNotRecognized`] is
/// returned and the caller keeps the host's unmodified path.
pub fn resolve_source(
    extracted_root: &Path,
    identity: &PluginIdentity,
    default_branch: &str,
) -> Result<PathBuf, RelocateError> {
    let mut expected = extracted_root.join(format!("{}-{}", identity.forge_repo, default_branch));
    if let Some(subfolder) = &identity.subfolder {
        expected = expected.join(subfolder);
    }
    if expected.is_dir() {
        debug!(path = %expected.display(), "deterministic archive layout matched");
        return Ok(expected);
    }

    let mut children: Vec<PathBuf> = std::fs::read_dir(extracted_root)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    children.sort();

    for child in children {
        match &identity.subfolder {
            Some(subfolder) => {
                let candidate = child.join(subfolder);
                if candidate.is_dir() {
                    debug!(path = %candidate.display(), "enumerated archive layout matched subfolder");
                    return Ok(candidate);
                }
            }
            None => {
                if child.join(&identity.entry_file).is_file() {
                    debug!(path = %child.display(), "enumerated archive layout matched entry file");
                    return Ok(child);
                }
            }
        }
    }

    Err(RelocateError::LayoutNotRecognized {
        root: extracted_root.to_path_buf(),
    })
}

/// Renames the host-placed destination directory to the exact plugin slug.
///
/// No-op when the destination already matches. The move goes through the
/// injected [`FileMover`]; on failure the partial state is surfaced as
/// [`RelocateError::Move`] for the host installer's own cleanup path.
pub fn finalize_destination(
    installed_path: &Path,
    identity: &PluginIdentity,
    mover: &dyn FileMover,
) -> Result<PathBuf, RelocateError> {
    let parent = installed_path
        .parent()
        .ok_or_else(|| RelocateError::LayoutNotRecognized {
            root: installed_path.to_path_buf(),
        })?;
    let target = parent.join(&identity.slug);

    if installed_path == target {
        return Ok(target);
    }

    debug!(
        from = %installed_path.display(),
        to = %target.display(),
        "renaming install destination to plugin slug"
    );
    mover
        .move_dir(installed_path, &target)
        .map_err(|source| RelocateError::Move {
            from: installed_path.to_path_buf(),
            to: target.clone(),
            source,
        })?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::PluginHeaders;
    use std::fs;

    fn identity(subfolder: Option<&str>) -> PluginIdentity {
        let headers = PluginHeaders {
            version: Some("1.0.0".into()),
            forge_repo: Some("example/myrepo".into()),
            forge_folder: subfolder.map(str::to_string),
            ..Default::default()
        };
        PluginIdentity::from_headers("myplugin".into(), "myplugin.php".into(), &headers).unwrap()
    }

    #[test]
    fn test_deterministic_layout_with_subfolder() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("myrepo-main/subdir")).unwrap();

        let found = resolve_source(root.path(), &identity(Some("subdir")), "main").unwrap();
        assert_eq!(found, root.path().join("myrepo-main/subdir"));
    }

    #[test]
    fn test_deterministic_layout_without_subfolder() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("myrepo-main")).unwrap();

        let found = resolve_source(root.path(), &identity(None), "main").unwrap();
        assert_eq!(found, root.path().join("myrepo-main"));
    }

    #[test]
    fn test_enumeration_fallback_on_entry_file() {
        // Tag archives unpack as <repo>-<tag>, which the deterministic
        // guess misses; enumeration must find the entry file instead.
        let root = tempfile::tempdir().unwrap();
        let child = root.path().join("myrepo-v2.0.0");
        fs::create_dir_all(&child).unwrap();
        fs::write(child.join("myplugin.php"), "<?php").unwrap();

        let found = resolve_source(root.path(), &identity(None), "main").unwrap();
        assert_eq!(found, child);
    }

    #[test]
    fn test_enumeration_fallback_on_subfolder() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("myrepo-v2.0.0/subdir")).unwrap();

        let found = resolve_source(root.path(), &identity(Some("subdir")), "main").unwrap();
        assert_eq!(found, root.path().join("myrepo-v2.0.0/subdir"));
    }

    #[test]
    fn test_enumeration_skips_unrelated_children() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("aaa-other")).unwrap();
        let child = root.path().join("zzz-plugin");
        fs::create_dir_all(&child).unwrap();
        fs::write(child.join("myplugin.php"), "<?php").unwrap();

        let found = resolve_source(root.path(), &identity(None), "main").unwrap();
        assert_eq!(found, child);
    }

    #[test]
    fn test_unrecognized_layout_is_soft_error() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("something-else")).unwrap();

        let err = resolve_source(root.path(), &identity(None), "main").unwrap_err();
        assert!(matches!(err, RelocateError::LayoutNotRecognized { .. }));
    }

    #[test]
    fn test_finalize_renames_to_slug() {
        let plugins = tempfile::tempdir().unwrap();
        let placed = plugins.path().join("myrepo-main");
        fs::create_dir_all(&placed).unwrap();
        fs::write(placed.join("myplugin.php"), "<?php").unwrap();

        let target = finalize_destination(&placed, &identity(None), &StdFileMover).unwrap();
        assert_eq!(target, plugins.path().join("myplugin"));
        assert!(target.join("myplugin.php").is_file());
        assert!(!placed.exists());
    }

    #[test]
    fn test_finalize_replaces_existing_destination() {
        let plugins = tempfile::tempdir().unwrap();
        let old = plugins.path().join("myplugin");
        fs::create_dir_all(&old).unwrap();
        fs::write(old.join("stale.txt"), "old").unwrap();
        let placed = plugins.path().join("myrepo-main");
        fs::create_dir_all(&placed).unwrap();
        fs::write(placed.join("myplugin.php"), "<?php").unwrap();

        let target = finalize_destination(&placed, &identity(None), &StdFileMover).unwrap();
        assert!(target.join("myplugin.php").is_file());
        assert!(!target.join("stale.txt").exists());
    }

    #[test]
    fn test_finalize_is_noop_when_already_correct() {
        let plugins = tempfile::tempdir().unwrap();
        let placed = plugins.path().join("myplugin");
        fs::create_dir_all(&placed).unwrap();

        let target = finalize_destination(&placed, &identity(None), &StdFileMover).unwrap();
        assert_eq!(target, placed);
        assert!(placed.exists());
    }
}
