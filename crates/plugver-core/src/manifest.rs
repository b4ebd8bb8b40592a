//! JSON manifest reading and version rewriting.
//!
//! Manifests are treated as untyped JSON objects: only the `version` key is
//! touched, every other key is carried through in its original order.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use semver::Version;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::version::{self, VersionError};

/// Errors from manifest operations.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The top-level JSON value is not an object.
    #[error("{path} must contain a JSON object")]
    NotAnObject {
        /// Manifest path.
        path: Utf8PathBuf,
    },

    /// The manifest has no string `version` field.
    #[error("{path} has no string \"version\" field")]
    MissingVersion {
        /// Manifest path.
        path: Utf8PathBuf,
    },

    /// The `version` field is not a valid version triple.
    #[error("{path}: {source}")]
    Version {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Parse failure.
        source: VersionError,
    },

    /// The manifest could not be serialized back to JSON.
    #[error("failed to render {path}: {source}")]
    Render {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Result alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Read and parse the JSON document at `path`, whatever its shape.
#[instrument(fields(%path))]
pub fn load_json(path: &Utf8Path) -> ManifestResult<Value> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(path, &content)
}

fn parse_json(path: &Utf8Path, content: &str) -> ManifestResult<Value> {
    serde_json::from_str(content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// A parsed manifest document, remembering where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    path: Utf8PathBuf,
    fields: Map<String, Value>,
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    pub fn load(path: &Utf8Path) -> ManifestResult<Self> {
        Self::from_value(path, load_json(path)?)
    }

    /// Parse manifest text that was read from `path`.
    pub fn parse(path: &Utf8Path, content: &str) -> ManifestResult<Self> {
        Self::from_value(path, parse_json(path, content)?)
    }

    fn from_value(path: &Utf8Path, value: Value) -> ManifestResult<Self> {
        let Value::Object(fields) = value else {
            return Err(ManifestError::NotAnObject {
                path: path.to_path_buf(),
            });
        };
        debug!(keys = fields.len(), "parsed manifest");
        Ok(Self {
            path: path.to_path_buf(),
            fields,
        })
    }

    /// The raw `version` string, if present.
    pub fn version_str(&self) -> Option<&str> {
        self.fields.get("version").and_then(Value::as_str)
    }

    /// The parsed `version` field.
    pub fn version(&self) -> ManifestResult<Version> {
        let raw = self
            .version_str()
            .ok_or_else(|| ManifestError::MissingVersion {
                path: self.path.clone(),
            })?;
        version::parse_version(raw).map_err(|source| ManifestError::Version {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace (or insert) the `version` field.
    pub fn set_version(&mut self, version: &Version) {
        self.fields
            .insert("version".to_owned(), Value::String(version.to_string()));
    }

    /// Render as two-space-indented JSON with a trailing newline.
    pub fn render(&self) -> ManifestResult<String> {
        let body = serde_json::to_string_pretty(&self.fields).map_err(|source| {
            ManifestError::Render {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(format!("{body}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path(s: &str) -> &Utf8Path {
        Utf8Path::new(s)
    }

    #[test]
    fn reads_version_field() {
        let m = Manifest::parse(path("package.json"), r#"{"name":"x","version":"1.4.0"}"#)
            .unwrap();
        assert_eq!(m.version().unwrap(), Version::new(1, 4, 0));
    }

    #[test]
    fn set_version_preserves_key_order_and_other_fields() {
        let input = r#"{
  "name": "demo",
  "version": "1.4.0",
  "scripts": {
    "test": "bun test"
  },
  "private": true
}
"#;
        let mut m = Manifest::parse(path("package.json"), input).unwrap();
        m.set_version(&Version::new(1, 4, 1));

        let expected = input.replace("1.4.0", "1.4.1");
        assert_eq!(m.render().unwrap(), expected);
    }

    #[test]
    fn render_uses_two_space_indent_and_trailing_newline() {
        let m = Manifest::parse(path("p.json"), r#"{"a":{"b":[1,2]}}"#).unwrap();
        assert_eq!(
            m.render().unwrap(),
            "{\n  \"a\": {\n    \"b\": [\n      1,\n      2\n    ]\n  }\n}\n"
        );
    }

    #[test]
    fn set_version_inserts_missing_field() {
        let mut m = Manifest::parse(path("plugin.json"), r#"{"name":"x"}"#).unwrap();
        assert!(m.version_str().is_none());
        m.set_version(&Version::new(2, 0, 0));
        assert_eq!(m.version_str(), Some("2.0.0"));
    }

    #[test]
    fn missing_version_is_an_error() {
        let m = Manifest::parse(path("package.json"), r#"{"name":"x"}"#).unwrap();
        assert!(matches!(
            m.version(),
            Err(ManifestError::MissingVersion { .. })
        ));
    }

    #[test]
    fn non_string_version_is_an_error() {
        let m = Manifest::parse(path("package.json"), r#"{"version":1}"#).unwrap();
        assert!(matches!(
            m.version(),
            Err(ManifestError::MissingVersion { .. })
        ));
    }

    #[test]
    fn malformed_version_is_an_error() {
        let m = Manifest::parse(path("package.json"), r#"{"version":"1.x.0"}"#).unwrap();
        assert!(matches!(m.version(), Err(ManifestError::Version { .. })));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = Manifest::parse(path("package.json"), "{ not json").unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn array_root_is_rejected() {
        let err = Manifest::parse(path("package.json"), "[]").unwrap_err();
        assert!(matches!(err, ManifestError::NotAnObject { .. }));
    }

    #[test]
    fn load_missing_file_is_a_read_error() {
        let tmp = TempDir::new().unwrap();
        let missing = Utf8PathBuf::try_from(tmp.path().join("package.json")).unwrap();
        assert!(matches!(
            Manifest::load(&missing),
            Err(ManifestError::Read { .. })
        ));
    }
}
