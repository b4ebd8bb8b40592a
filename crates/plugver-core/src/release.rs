//! Release planning and execution.
//!
//! All orchestration logic lives here. The CLI is purely a display layer.
//!
//! # Two-phase workflow
//!
//! 1. **Plan** ([`plan_release`]): read the package manifest, compute the
//!    next version, and stage the new contents of every release file.
//! 2. **Execute** ([`ReleasePlan::execute`]): write the staged files.
//!
//! Nothing touches disk until every file has been read and transformed, so
//! a missing or malformed input aborts the release with all files intact.

use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use semver::Version;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::changelog::{self, Placement};
use crate::config::FilesConfig;
use crate::manifest::{Manifest, ManifestError};
use crate::version::{BumpLevel, VersionError, next_version};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from release operations.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// A manifest could not be read, parsed, or lacks a usable version.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The current version cannot be bumped any further.
    #[error(transparent)]
    Bump(#[from] VersionError),

    /// The changelog could not be read.
    #[error("failed to read {path}: {source}")]
    ReadChangelog {
        /// Changelog path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A staged file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result alias for release operations.
pub type ReleaseResult<T> = Result<T, ReleaseError>;

// ──────────────────────────────────────────────
// Plan types
// ──────────────────────────────────────────────

/// Which release file a staged write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileRole {
    /// The package manifest (`package.json`).
    PackageManifest,
    /// The plugin manifest (`.claude-plugin/plugin.json`).
    PluginManifest,
    /// The changelog (`CHANGELOG.md`).
    Changelog,
}

/// New contents for one release file, not yet written.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// What this file is.
    pub role: FileRole,
    /// Path as configured, for display.
    pub display: Utf8PathBuf,
    /// Resolved path that will be written.
    pub path: Utf8PathBuf,
    /// Full replacement contents.
    pub contents: String,
}

/// A fully computed release, ready to write.
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    /// Version read from the package manifest.
    pub previous: Version,
    /// The computed next version.
    pub next: Version,
    /// Requested bump level.
    pub level: BumpLevel,
    /// Date stamped on the changelog entry.
    pub date: NaiveDate,
    /// Where the changelog entry landed.
    pub placement: Placement,
    /// Files to write, in order.
    pub files: Vec<StagedFile>,
}

// ──────────────────────────────────────────────
// Plan
// ──────────────────────────────────────────────

/// Plan a release: read every file, bump the version, stage new contents.
///
/// # Arguments
/// * `project_root` - directory the configured paths are relative to
/// * `files` - configured release file locations
/// * `level` - which version component to bump
/// * `date` - date for the changelog header
#[instrument(skip(files), fields(%project_root, %level))]
pub fn plan_release(
    project_root: &Utf8Path,
    files: &FilesConfig,
    level: BumpLevel,
    date: NaiveDate,
) -> ReleaseResult<ReleasePlan> {
    let resolved = files.resolve(project_root);

    let mut package = Manifest::load(&resolved.package_manifest)?;
    let previous = package.version()?;
    let next = next_version(&previous, level)?;
    debug!(%previous, %next, "computed next version");

    package.set_version(&next);

    let mut plugin = Manifest::load(&resolved.plugin_manifest)?;
    plugin.set_version(&next);

    let changelog_text = fs::read_to_string(&resolved.changelog).map_err(|source| {
        ReleaseError::ReadChangelog {
            path: resolved.changelog.clone(),
            source,
        }
    })?;
    let (changelog_text, placement) = changelog::insert_entry(&changelog_text, &next, date);

    let staged = vec![
        StagedFile {
            role: FileRole::PackageManifest,
            display: files.package_manifest.clone(),
            path: resolved.package_manifest,
            contents: package.render()?,
        },
        StagedFile {
            role: FileRole::PluginManifest,
            display: files.plugin_manifest.clone(),
            path: resolved.plugin_manifest,
            contents: plugin.render()?,
        },
        StagedFile {
            role: FileRole::Changelog,
            display: files.changelog.clone(),
            path: resolved.changelog,
            contents: changelog_text,
        },
    ];

    Ok(ReleasePlan {
        previous,
        next,
        level,
        date,
        placement,
        files: staged,
    })
}

// ──────────────────────────────────────────────
// Execute
// ──────────────────────────────────────────────

/// Result of a successful release.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
    /// The previous version.
    pub previous: Version,
    /// The new version.
    pub new: Version,
    /// Changelog entry date (`YYYY-MM-DD`).
    pub date: String,
    /// Files that were written, as configured.
    pub modified_files: Vec<String>,
    /// Suggested commit message.
    pub commit_message: String,
    /// Suggested tag name.
    pub tag: String,
}

impl ReleasePlan {
    /// Suggested git tag for the new version.
    pub fn tag(&self) -> String {
        format!("v{}", self.next)
    }

    /// Suggested commit message for the new version.
    pub fn commit_message(&self) -> String {
        format!("chore: release v{}", self.next)
    }

    /// Write every staged file in order.
    ///
    /// `on_written` is called after each successful write. A failure stops
    /// the remaining writes; files already written stay written.
    #[instrument(skip_all, fields(next = %self.next))]
    pub fn execute(&self, mut on_written: impl FnMut(&StagedFile)) -> ReleaseResult<ReleaseOutcome> {
        let mut modified_files = Vec::with_capacity(self.files.len());

        for file in &self.files {
            write_atomic(&file.path, &file.contents)?;
            debug!(path = %file.path, role = ?file.role, "wrote file");
            modified_files.push(file.display.to_string());
            on_written(file);
        }

        info!(previous = %self.previous, new = %self.next, "release prepared");

        Ok(ReleaseOutcome {
            previous: self.previous.clone(),
            new: self.next.clone(),
            date: self.date.format("%Y-%m-%d").to_string(),
            modified_files,
            commit_message: self.commit_message(),
            tag: self.tag(),
        })
    }
}

// ──────────────────────────────────────────────
// Internal helpers
// ──────────────────────────────────────────────

/// Replace `path` with `contents` via a temp file in the same directory.
///
/// A symlinked `path` is resolved first so the link survives, and the
/// existing file's permissions are carried over to the replacement.
fn write_atomic(path: &Utf8Path, contents: &str) -> ReleaseResult<()> {
    let write_err = |source| ReleaseError::Write {
        path: path.to_path_buf(),
        source,
    };

    let target = fs::canonicalize(path)
        .ok()
        .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
        .unwrap_or_else(|| path.to_path_buf());
    let dir = target
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    if let Ok(meta) = fs::metadata(&target) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(&target).map_err(|e| write_err(e.error))?;
    Ok(())
}
