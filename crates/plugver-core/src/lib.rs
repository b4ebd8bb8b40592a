//! Core library for plugver.
//!
//! This crate holds everything the `plugver-release` and `plugver-validate`
//! binaries do; the CLI crate only parses arguments and prints results.
//!
//! # Modules
//!
//! - [`changelog`] - Changelog stub insertion
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`manifest`] - JSON manifest reading and version rewriting
//! - [`release`] - Release planning and execution
//! - [`validate`] - Plugin manifest schema validation
//! - [`version`] - Version parsing and bump computation
//!
//! # Quick Start
//!
//! ```no_run
//! use camino::Utf8Path;
//! use plugver_core::{BumpLevel, ConfigLoader, release};
//!
//! let config = ConfigLoader::new().load().expect("Failed to load configuration");
//! let today = chrono::Utc::now().date_naive();
//! let plan = release::plan_release(Utf8Path::new("."), &config.files, BumpLevel::Patch, today)
//!     .expect("Failed to plan release");
//! plan.execute(|file| println!("updated {}", file.display)).expect("Failed to write");
//! ```
#![deny(unsafe_code)]

pub mod changelog;

pub mod config;

pub mod error;

pub mod manifest;

pub mod release;

pub mod validate;

pub mod version;

pub use config::{Config, ConfigLoader, FilesConfig, LogLevel};

pub use error::{ConfigError, ConfigResult};

pub use version::BumpLevel;

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
