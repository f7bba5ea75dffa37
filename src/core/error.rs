//! Error types for forge communication, archive relocation, and configuration.
//!
//! # Propagation Policy
//!
//! None of these errors ever reach the host's update machinery. The resolver
//! swallows [`FetchError`] at its boundary and reports "no update";
//! [`RelocateError`] downgrades to "keep the host-selected path"; a
//! [`ConfigError`] at construction time disables the updater for that plugin.
//! Errors surface to operators only through `tracing` output and the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// A failure while querying the forge REST API.
///
/// Network failures, non-2xx statuses, undecodable bodies, and missing
/// version fields all collapse into this one type. The resolver deliberately
/// does not distinguish between them: any uncertainty means no update is
/// advertised.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS) or an unparsable
    /// JSON body reported by the HTTP client.
    #[error("forge request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The forge answered with a non-success HTTP status.
    #[error("forge returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code from the response.
        status: reqwest::StatusCode,
        /// The request URL, for diagnostics.
        url: String,
    },

    /// The response body was syntactically valid but not usable, e.g. the
    /// contents API returned something other than base64 file text.
    #[error("forge response for {url} could not be decoded: {reason}")]
    Decode {
        /// The request URL, for diagnostics.
        url: String,
        /// What failed to decode.
        reason: String,
    },

    /// File-probe discovery fetched the file but found no version header.
    #[error("no version header matched in {path}")]
    VersionNotFound {
        /// Repository-relative path of the probed file.
        path: String,
    },
}

/// A failure while repairing the on-disk layout of an extracted archive.
///
/// Always non-fatal: callers treat any variant as "best effort failed" and
/// proceed with the host's default path rather than aborting the install.
#[derive(Error, Debug)]
pub enum RelocateError {
    /// Neither the deterministic `<repo>-<branch>` path nor directory
    /// enumeration produced a plausible plugin directory.
    #[error("no recognizable plugin layout under {root}")]
    LayoutNotRecognized {
        /// Root of the extracted archive that was searched.
        root: PathBuf,
    },

    /// The filesystem move primitive failed partway. The host installer's
    /// own failure path is relied upon for cleanup.
    #[error("failed to move {from} to {to}")]
    Move {
        /// Source directory of the attempted move.
        from: PathBuf,
        /// Destination directory of the attempted move.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Listing the extracted root failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An invalid or missing forge binding for a plugin.
///
/// Raised only while constructing a [`PluginIdentity`](crate::manifest::PluginIdentity)
/// or an [`UpdateResolver`](crate::resolver::UpdateResolver). The caller is
/// expected to log at `debug` and skip update support for the plugin rather
/// than erroring noisily.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The plugin entry file could not be read.
    #[error("failed to read plugin entry file {path}")]
    EntryFileUnreadable {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No forge repository header was present; the plugin is not bound to a
    /// forge and the update mechanism does not apply to it.
    #[error("plugin '{slug}' has no forge repository binding")]
    MissingForgeRepo {
        /// Install slug of the plugin.
        slug: String,
    },

    /// The forge repository header was present but not in `owner/repo` form.
    #[error("forge repository '{value}' is not in owner/repo form")]
    InvalidForgeRepo {
        /// The literal header value.
        value: String,
    },

    /// The entry file header block declared no `Version:` field.
    #[error("plugin entry file {path} declares no Version header")]
    MissingVersionHeader {
        /// Path of the entry file.
        path: PathBuf,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to initialize forge HTTP client")]
    HttpClient(#[source] reqwest::Error),
}
