//! Version comparison utilities for update decisions.
//!
//! This module answers exactly one question for the resolver: is the remote
//! version strictly newer than the installed one? The answer must be total
//! and consistent (no two calls with the same inputs disagree), must tolerate
//! the tag-naming prefixes forges encourage (`v1.2.3`, `release-1.2.3`), and
//! must never panic on operator-supplied strings.
//!
//! # Comparison Rules
//!
//! 1. Both sides are normalized: common prefixes (`v`, `version-`,
//!    `release-`) and at most one other leading non-digit character are
//!    stripped. A string that still does not start with an ASCII digit is
//!    malformed.
//! 2. Malformed input on either side compares as not-newer. The updater
//!    never advertises an install on ambiguous data.
//! 3. If both normalized strings parse as strict semver, semver ordering
//!    decides.
//! 4. Otherwise components are split on `.` and compared left to right:
//!    numerically where both parse as integers, lexically otherwise. The
//!    shorter sequence is padded with zeros, so `1.2` == `1.2.0`.
//!
//! # Examples
//!
//! ```rust
//! use forge_updater::version::VersionComparator;
//!
//! assert!(VersionComparator::is_newer("1.2.0", "1.3.0"));
//! assert!(VersionComparator::is_newer("v1.0.1", "1.0.2"));
//! assert!(!VersionComparator::is_newer("1.0.0", "abc"));
//! ```

use std::cmp::Ordering;

/// Stateless version comparison, shared by the resolver and the CLI.
pub struct VersionComparator;

impl VersionComparator {
    /// Returns `true` when `remote` is strictly newer than `installed`.
    ///
    /// Malformed input on either side yields `false`: a missing or garbled
    /// version must never trigger an update offer.
    pub fn is_newer(installed: &str, remote: &str) -> bool {
        match (Self::normalize(installed), Self::normalize(remote)) {
            (Some(a), Some(b)) => Self::compare(a, b) == Ordering::Less,
            _ => false,
        }
    }

    /// Strips tag-naming prefixes and validates the result.
    ///
    /// Removes a `version-` or `release-` prefix, or failing that a single
    /// leading non-digit character (the `v` convention). Returns `None` when
    /// the remainder does not begin with an ASCII digit; such strings take
    /// no part in comparisons.
    ///
    /// ```rust
    /// use forge_updater::version::VersionComparator;
    ///
    /// assert_eq!(VersionComparator::normalize("v2.0.0"), Some("2.0.0"));
    /// assert_eq!(VersionComparator::normalize("release-1.1"), Some("1.1"));
    /// assert_eq!(VersionComparator::normalize("abc"), None);
    /// ```
    pub fn normalize(raw: &str) -> Option<&str> {
        let trimmed = raw.trim();
        let stripped = if let Some(rest) = trimmed.strip_prefix("version-") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("release-") {
            rest
        } else {
            match trimmed.chars().next() {
                Some(c) if !c.is_ascii_digit() => &trimmed[c.len_utf8()..],
                _ => trimmed,
            }
        };

        if stripped.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            Some(stripped)
        } else {
            None
        }
    }

    /// Total ordering over two normalized version strings.
    ///
    /// Inputs are expected to have passed [`normalize`](Self::normalize);
    /// the function is still total for arbitrary strings.
    fn compare(a: &str, b: &str) -> Ordering {
        // Strict semver pairs get exact precedence rules (pre-release
        // ordering, build metadata ignored).
        if let (Ok(va), Ok(vb)) = (semver::Version::parse(a), semver::Version::parse(b)) {
            return va.cmp(&vb);
        }

        let left: Vec<&str> = a.split('.').collect();
        let right: Vec<&str> = b.split('.').collect();
        let len = left.len().max(right.len());

        for i in 0..len {
            let sa = left.get(i).copied().unwrap_or("0");
            let sb = right.get(i).copied().unwrap_or("0");
            let ord = match (sa.parse::<u64>(), sb.parse::<u64>()) {
                (Ok(na), Ok(nb)) => na.cmp(&nb),
                _ => sa.cmp(sb),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }

        Ordering::Equal
    }
}
