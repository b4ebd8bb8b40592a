//! Plugin manifest schema validation.
//!
//! The schema is declared once as static data and walked
//! against an untyped JSON value. Validation never fails early: every issue
//! is collected, then folded into a [`ValidationReport`] tree keyed by field
//! path. A clean walk deserializes the value into a typed [`PluginManifest`].
//!
//! The report serializes in the familiar `_errors` shape:
//!
//! ```json
//! {
//!   "_errors": [],
//!   "author": {
//!     "_errors": [],
//!     "email": { "_errors": ["Invalid email"] }
//!   }
//! }
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, instrument};

// ──────────────────────────────────────────────
// Typed manifest
// ──────────────────────────────────────────────

/// A plugin manifest that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluginManifest {
    /// Plugin name.
    pub name: String,
    /// `major.minor.patch` version.
    pub version: String,
    /// One-line description.
    pub description: String,
    /// Plugin author.
    pub author: Author,
    /// Project homepage URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Source repository URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// License identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Search keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// Runtime version requirements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engines: Option<Engines>,
}

/// Manifest author.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Author homepage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Engine version requirements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Engines {
    /// Required host version range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude: Option<String>,
    /// Required Node.js version range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
}

// ──────────────────────────────────────────────
// Schema
// ──────────────────────────────────────────────

/// Extra constraint on a string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// Any string.
    Any,
    /// `digits.digits.digits`.
    Semver,
    /// An email address.
    Email,
    /// An absolute URL.
    Url,
}

/// Shape a JSON value must have.
#[derive(Debug)]
enum Rule {
    /// A string, optionally with a format.
    String(Format),
    /// An array whose elements all match the inner rule.
    Array(&'static Rule),
    /// An object with the listed fields; unknown fields are allowed.
    Object(&'static [Field]),
}

/// A named object member.
#[derive(Debug)]
struct Field {
    /// Member name.
    name: &'static str,
    /// Whether absence is an error.
    required: bool,
    /// Shape of the member's value.
    rule: Rule,
}

impl Field {
    const fn required(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            required: true,
            rule,
        }
    }

    const fn optional(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            required: false,
            rule,
        }
    }
}

static AUTHOR_FIELDS: [Field; 3] = [
    Field::required("name", Rule::String(Format::Any)),
    Field::optional("email", Rule::String(Format::Email)),
    Field::optional("url", Rule::String(Format::Url)),
];

static ENGINES_FIELDS: [Field; 2] = [
    Field::optional("claude", Rule::String(Format::Any)),
    Field::optional("node", Rule::String(Format::Any)),
];

static KEYWORD: Rule = Rule::String(Format::Any);

static MANIFEST_FIELDS: [Field; 9] = [
    Field::required("name", Rule::String(Format::Any)),
    Field::required("version", Rule::String(Format::Semver)),
    Field::required("description", Rule::String(Format::Any)),
    Field::required("author", Rule::Object(&AUTHOR_FIELDS)),
    Field::optional("homepage", Rule::String(Format::Url)),
    Field::optional("repository", Rule::String(Format::Url)),
    Field::optional("license", Rule::String(Format::Any)),
    Field::optional("keywords", Rule::Array(&KEYWORD)),
    Field::optional("engines", Rule::Object(&ENGINES_FIELDS)),
];

/// The plugin manifest schema.
static PLUGIN_MANIFEST: Rule = Rule::Object(&MANIFEST_FIELDS);

static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("semver pattern is valid")
});

// Local part may not start with a dot or contain consecutive dots; those two
// rules are checked separately since the regex crate has no lookaround.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("email pattern is valid")
});

fn is_email(s: &str) -> bool {
    !s.starts_with('.') && !s.contains("..") && EMAIL.is_match(s)
}

fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

impl Format {
    /// Message for a string that fails this format, if it does.
    fn check(self, s: &str) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::Semver => (!SEMVER.is_match(s)).then_some("Version must follow semver format"),
            Self::Email => (!is_email(s)).then_some("Invalid email"),
            Self::Url => (!is_url(s)).then_some("Invalid url"),
        }
    }
}

/// JSON type name used in messages.
const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ──────────────────────────────────────────────
// Report
// ──────────────────────────────────────────────

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Field path from the document root (object keys or array indices).
    pub path: Vec<String>,
    /// Human-readable message.
    pub message: String,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

/// One level of the nested error report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ErrorNode {
    errors: Vec<String>,
    children: Vec<(String, ErrorNode)>,
}

impl ErrorNode {
    /// Messages attached directly to this node.
    fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Child node for a field name or array index.
    fn child(&self, key: &str) -> Option<&Self> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    fn child_mut(&mut self, key: &str) -> &mut Self {
        let idx = match self.children.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.children.push((key.to_owned(), Self::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[idx].1
    }
}

impl Serialize for ErrorNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len() + 1))?;
        map.serialize_entry("_errors", &self.errors)?;
        for (key, node) in &self.children {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

/// All problems found in a manifest, flat and as a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<Issue>,
    root: ErrorNode,
}

impl ValidationReport {
    fn from_issues(issues: Vec<Issue>) -> Self {
        let mut root = ErrorNode::default();
        for issue in &issues {
            let node = issue
                .path
                .iter()
                .fold(&mut root, |node, key| node.child_mut(key));
            node.errors.push(issue.message.clone());
        }
        Self { issues, root }
    }

    /// Issues in the order they were found.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Messages recorded at exactly `path`.
    pub fn errors_at(&self, path: &[&str]) -> &[String] {
        path.iter()
            .try_fold(&self.root, |node, key| node.child(key))
            .map_or(&[][..], |node| node.errors())
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

// ──────────────────────────────────────────────
// Validation
// ──────────────────────────────────────────────

/// Validate `value` against the plugin manifest schema.
///
/// Returns the typed manifest, or a report of every problem found.
#[instrument(skip_all)]
pub fn validate_manifest(value: &Value) -> Result<PluginManifest, ValidationReport> {
    let issues = check_value(&PLUGIN_MANIFEST, value);
    if !issues.is_empty() {
        debug!(issues = issues.len(), "manifest failed validation");
        return Err(ValidationReport::from_issues(issues));
    }

    PluginManifest::deserialize(value).map_err(|e| {
        ValidationReport::from_issues(vec![Issue {
            path: Vec::new(),
            message: e.to_string(),
        }])
    })
}

/// Walk `value` against `rule`, collecting every issue.
fn check_value(rule: &Rule, value: &Value) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut path = Vec::new();
    check(rule, value, &mut path, &mut issues);
    issues
}

fn check(rule: &Rule, value: &Value, path: &mut Vec<String>, issues: &mut Vec<Issue>) {
    match (rule, value) {
        (Rule::String(format), Value::String(s)) => {
            if let Some(message) = format.check(s) {
                push_issue(issues, path, message.to_owned());
            }
        }
        (Rule::Array(inner), Value::Array(items)) => {
            for (idx, item) in items.iter().enumerate() {
                path.push(idx.to_string());
                check(inner, item, path, issues);
                path.pop();
            }
        }
        (Rule::Object(fields), Value::Object(map)) => {
            for field in *fields {
                path.push(field.name.to_owned());
                match map.get(field.name) {
                    Some(member) => check(&field.rule, member, path, issues),
                    None if field.required => push_issue(issues, path, "Required".to_owned()),
                    None => {}
                }
                path.pop();
            }
        }
        (rule, other) => {
            let expected = match rule {
                Rule::String(_) => "string",
                Rule::Array(_) => "array",
                Rule::Object(_) => "object",
            };
            push_issue(
                issues,
                path,
                format!("Expected {expected}, received {}", type_name(other)),
            );
        }
    }
}

fn push_issue(issues: &mut Vec<Issue>, path: &[String], message: String) {
    issues.push(Issue {
        path: path.to_vec(),
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "name": "x",
            "version": "1.2.3",
            "description": "d",
            "author": { "name": "a" }
        })
    }

    #[test]
    fn accepts_minimal_manifest() {
        let manifest = validate_manifest(&minimal()).unwrap();
        assert_eq!(manifest.name, "x");
        assert_eq!(manifest.version, "1.2.3");
        assert_eq!(manifest.author.name, "a");
        assert!(manifest.keywords.is_none());
    }

    #[test]
    fn accepts_full_manifest() {
        let value = json!({
            "name": "demo",
            "version": "10.0.12",
            "description": "A demo plugin",
            "author": {
                "name": "Ada",
                "email": "ada.lovelace+plugins@example.co.uk",
                "url": "https://example.com/ada"
            },
            "homepage": "https://example.com",
            "repository": "git+https://github.com/example/demo.git",
            "license": "MIT",
            "keywords": ["release", "plugin"],
            "engines": { "claude": ">=1.0.0", "node": ">=18" }
        });
        let manifest = validate_manifest(&value).unwrap();
        assert_eq!(manifest.keywords.as_deref().map(<[String]>::len), Some(2));
        assert_eq!(
            manifest.engines.and_then(|e| e.node).as_deref(),
            Some(">=18")
        );
    }

    #[test]
    fn unknown_fields_are_allowed() {
        let mut value = minimal();
        value["commands"] = json!(["./commands"]);
        value["author"]["twitter"] = json!("@a");
        assert!(validate_manifest(&value).is_ok());
    }

    #[test]
    fn rejects_two_part_version_under_version_path() {
        let mut value = minimal();
        value["version"] = json!("1.2");
        let report = validate_manifest(&value).unwrap_err();

        assert_eq!(
            report.errors_at(&["version"]),
            ["Version must follow semver format"]
        );
        assert_eq!(report.issues().len(), 1);
    }

    #[test]
    fn rejects_version_with_prerelease_or_newline() {
        for bad in ["1.2.3-beta", "1.2.3\n", "v1.2.3", "1.2.٣"] {
            let mut value = minimal();
            value["version"] = json!(bad);
            assert!(validate_manifest(&value).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn missing_author_is_reported_under_author() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("author");
        let report = validate_manifest(&value).unwrap_err();
        assert_eq!(report.errors_at(&["author"]), ["Required"]);
    }

    #[test]
    fn nested_errors_are_nested_in_the_tree() {
        let mut value = minimal();
        value["author"]["email"] = json!("not-an-email");
        value["author"]["url"] = json!("example.com");
        let report = validate_manifest(&value).unwrap_err();

        assert_eq!(report.errors_at(&["author", "email"]), ["Invalid email"]);
        assert_eq!(report.errors_at(&["author", "url"]), ["Invalid url"]);
        assert!(report.errors_at(&["author"]).is_empty());

        let tree = serde_json::to_value(&report).unwrap();
        assert_eq!(
            tree,
            json!({
                "_errors": [],
                "author": {
                    "_errors": [],
                    "email": { "_errors": ["Invalid email"] },
                    "url": { "_errors": ["Invalid url"] }
                }
            })
        );
    }

    #[test]
    fn array_elements_are_keyed_by_index() {
        let mut value = minimal();
        value["keywords"] = json!(["ok", 7, true]);
        let report = validate_manifest(&value).unwrap_err();

        assert_eq!(
            report.errors_at(&["keywords", "1"]),
            ["Expected string, received number"]
        );
        assert_eq!(
            report.errors_at(&["keywords", "2"]),
            ["Expected string, received boolean"]
        );
        assert_eq!(report.issues()[0].to_string(), "keywords.1: Expected string, received number");
    }

    #[test]
    fn wrong_types_name_both_sides() {
        let mut value = minimal();
        value["name"] = json!(null);
        value["engines"] = json!("node");
        value["keywords"] = json!("one");
        let report = validate_manifest(&value).unwrap_err();

        assert_eq!(report.errors_at(&["name"]), ["Expected string, received null"]);
        assert_eq!(
            report.errors_at(&["engines"]),
            ["Expected object, received string"]
        );
        assert_eq!(
            report.errors_at(&["keywords"]),
            ["Expected array, received string"]
        );
    }

    #[test]
    fn every_problem_is_collected() {
        let report = validate_manifest(&json!({})).unwrap_err();
        let paths: Vec<String> = report.issues().iter().map(|i| i.path.join(".")).collect();
        assert_eq!(paths, ["name", "version", "description", "author"]);
    }

    #[test]
    fn non_object_root_reports_at_root() {
        let report = validate_manifest(&json!([1, 2])).unwrap_err();
        assert_eq!(report.errors_at(&[]), ["Expected object, received array"]);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({ "_errors": ["Expected object, received array"] })
        );
    }

    #[test]
    fn email_edge_cases() {
        assert!(is_email("a@b.io"));
        assert!(is_email("first.last@sub.example.org"));
        assert!(!is_email(".a@b.io"));
        assert!(!is_email("a..b@b.io"));
        assert!(!is_email("a.@b.io"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a@b.c"));
    }

    #[test]
    fn url_requires_scheme() {
        assert!(is_url("https://example.com"));
        assert!(is_url("mailto:a@b.io"));
        assert!(!is_url("example.com"));
        assert!(!is_url(""));
    }
}
