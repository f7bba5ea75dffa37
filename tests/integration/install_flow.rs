//! Extracted archive -> source selection -> post-install relocation and
//! reactivation.

use forge_updater::config::ResolverConfig;
use forge_updater::installer::StdFileMover;
use forge_updater::manifest::PluginIdentity;
use forge_updater::resolver::UpdateResolver;

use crate::common::{ENTRY_FILE, RecordingHost, StubForge, write_plugin};

fn resolver_for(subfolder: Option<&str>) -> (tempfile::TempDir, UpdateResolver<StubForge>) {
    let plugins = tempfile::tempdir().unwrap();
    let entry = write_plugin(plugins.path(), "1.0.1", subfolder);
    let (identity, headers) = PluginIdentity::from_entry_file(&entry).unwrap();
    let resolver = UpdateResolver::with_source(
        identity,
        headers,
        ResolverConfig::default(),
        StubForge::with_release("v2.0.0"),
    )
    .unwrap();
    (plugins, resolver)
}

#[test]
fn test_source_selection_fixes_branch_archive_layout() {
    let (_plugins, resolver) = resolver_for(None);

    let upgrade = tempfile::tempdir().unwrap();
    let extracted = upgrade.path().join("myrepo-main");
    std::fs::create_dir_all(&extracted).unwrap();
    std::fs::write(extracted.join(ENTRY_FILE), "<?php").unwrap();

    let host_choice = upgrade.path().to_path_buf();
    let corrected = resolver.on_source_selection(&host_choice, upgrade.path());
    assert_eq!(corrected, extracted);
}

#[test]
fn test_source_selection_descends_into_subfolder() {
    let (_plugins, resolver) = resolver_for(Some("plugin"));

    let upgrade = tempfile::tempdir().unwrap();
    let nested = upgrade.path().join("myrepo-main/plugin");
    std::fs::create_dir_all(&nested).unwrap();

    let corrected = resolver.on_source_selection(upgrade.path(), upgrade.path());
    assert_eq!(corrected, nested);
}

#[test]
fn test_source_selection_keeps_host_choice_on_unknown_layout() {
    let (_plugins, resolver) = resolver_for(None);

    let upgrade = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(upgrade.path().join("unrelated")).unwrap();

    let host_choice = upgrade.path().join("unrelated");
    let corrected = resolver.on_source_selection(&host_choice, upgrade.path());
    assert_eq!(corrected, host_choice);
}

#[test]
fn test_post_install_renames_and_reactivates() {
    let (plugins, resolver) = resolver_for(None);

    // The state must be captured before the filesystem changes.
    let host = RecordingHost::new(true);
    let state = resolver.capture_install_state(&host);

    // The host installer placed the new version under the archive name.
    let placed = plugins.path().join("myrepo-main");
    std::fs::create_dir_all(&placed).unwrap();
    std::fs::write(placed.join(ENTRY_FILE), "<?php").unwrap();

    let destination = resolver
        .on_post_install(state, &placed, &StdFileMover, &host)
        .unwrap();

    assert_eq!(destination, plugins.path().join("example-tools"));
    assert!(destination.join(ENTRY_FILE).is_file());
    assert_eq!(*host.activated.lock().unwrap(), vec!["example-tools"]);
}

#[test]
fn test_post_install_skips_reactivation_when_inactive() {
    let (plugins, resolver) = resolver_for(None);

    let host = RecordingHost::new(false);
    let state = resolver.capture_install_state(&host);

    let placed = plugins.path().join("myrepo-main");
    std::fs::create_dir_all(&placed).unwrap();

    resolver
        .on_post_install(state, &placed, &StdFileMover, &host)
        .unwrap();

    assert!(host.activated.lock().unwrap().is_empty());
}
