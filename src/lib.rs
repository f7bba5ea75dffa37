//! forge-updater - Forge-Hosted Update Resolver
//!
//! Lets a plugin hosted on a source-code forge (a GitHub-like service exposing
//! a REST API for releases and file contents) advertise and install new
//! versions through a host content-management system's native update UI,
//! without the plugin being listed on an official marketplace.
//!
//! # Architecture Overview
//!
//! The crate reconciles three independent external contracts:
//! - the host's update-transient protocol (a slug-keyed map of pending updates),
//! - the forge's REST and archive conventions (release tags, zipball URLs,
//!   `<repo>-<branch>` top-level archive folders),
//! - the host's filesystem-abstraction move semantics during installs.
//!
//! ## Components
//!
//! - [`version`] - pure version comparison with prefix stripping and a
//!   fail-closed policy for malformed strings
//! - [`forge`] - authenticated HTTP client for the forge REST API plus the
//!   two release-discovery strategies (release-based and file-probe)
//! - [`manifest`] - plugin entry-file header parsing and [`manifest::PluginIdentity`]
//! - [`resolver`] - the orchestrator: decides whether an update exists and
//!   writes/removes the host's update record
//! - [`installer`] - archive layout fixing and post-install relocation
//! - [`config`] - resolver configuration (strategy, branch, timeouts)
//! - [`core`] - error types shared across the crate
//! - [`cli`] - operator-facing `status`/`check` commands
//!
//! ## Update Flow
//!
//! ```text
//! host check cycle
//!   └── UpdateResolver::on_check_for_update(store)
//!         ├── ReleaseSource::fetch_latest()      (forge REST API)
//!         ├── VersionComparator::is_newer()
//!         └── store.set(slug, UpdateRecord) | store.remove(slug)
//! host downloads + extracts package
//!   └── UpdateResolver::on_source_selection()   (archive layout fix)
//! host finalizes install
//!   └── UpdateResolver::on_post_install()       (slug rename + reactivation)
//! ```
//!
//! # Failure Policy
//!
//! All forge-communication failures fail closed: the host is never told
//! "update available" on uncertain data, and no error ever propagates into
//! the host's own update machinery. Archive relocation is best-effort; when
//! neither the deterministic nor the enumerated strategy recognizes the
//! extracted layout, the host's original source path is kept.
//!
//! # Example
//!
//! ```rust,no_run
//! use forge_updater::config::ResolverConfig;
//! use forge_updater::manifest::PluginIdentity;
//! use forge_updater::resolver::{MemoryStore, UpdateResolver, UpdateStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (identity, headers) =
//!     PluginIdentity::from_entry_file("plugins/my-plugin/my-plugin.php".as_ref())?;
//! let resolver = UpdateResolver::new(identity, headers, ResolverConfig::default())?;
//!
//! let mut store = MemoryStore::new();
//! store.prime("my-plugin", "1.0.0");
//! resolver.on_check_for_update(&mut store).await;
//!
//! if let Some(record) = store.get("my-plugin") {
//!     println!("update available: {}", record.new_version);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod forge;
pub mod installer;
pub mod manifest;
pub mod resolver;
pub mod utils;
pub mod version;
