//! Changelog stub insertion.
//!
//! New entries go directly above the most recent release header, which keeps
//! the document's title block at the top and releases in descending order.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use semver::Version;
use tracing::debug;

/// Line-start release header such as `## [1.4.0]`.
static RELEASE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^## \[[0-9]+\.[0-9]+\.[0-9]+\]").expect("release header pattern is valid")
});

/// Where a new entry was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Above the first existing release header.
    BeforeRelease,
    /// After the title block (first blank line).
    AfterTitle,
    /// Appended after a document that has no blank line.
    Appended,
}

/// Render the stub entry for `version` released on `date`.
pub fn entry(version: &Version, date: NaiveDate) -> String {
    format!(
        "## [{version}] - {}\n\n### Changed\n- TODO: Add changes\n\n",
        date.format("%Y-%m-%d")
    )
}

/// Byte offset of the first release header, if any.
fn first_release_header(changelog: &str) -> Option<usize> {
    RELEASE_HEADER.find(changelog).map(|m| m.start())
}

/// Insert a stub entry for `version` into `changelog`.
///
/// Returns the new text and where the entry went. Everything outside the
/// inserted block is kept byte-for-byte.
pub fn insert_entry(changelog: &str, version: &Version, date: NaiveDate) -> (String, Placement) {
    let block = entry(version, date);

    let (at, placement) = if let Some(pos) = first_release_header(changelog) {
        (pos, Placement::BeforeRelease)
    } else if let Some(pos) = changelog.find("\n\n") {
        (pos + 2, Placement::AfterTitle)
    } else {
        // No blank line anywhere: the whole document is the title block.
        let mut out = changelog.to_owned();
        if out.ends_with('\n') {
            out.push('\n');
        } else if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&block);
        debug!(placement = ?Placement::Appended, "inserted changelog entry");
        return (out, Placement::Appended);
    };

    let mut out = String::with_capacity(changelog.len() + block.len());
    out.push_str(&changelog[..at]);
    out.push_str(&block);
    out.push_str(&changelog[at..]);
    debug!(?placement, offset = at, "inserted changelog entry");
    (out, placement)
}
