//! Validate command: checks the plugin manifest and reports every problem.

use std::process::ExitCode;

use camino::Utf8Path;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use plugver_core::config::Config;
use plugver_core::manifest;
use plugver_core::validate::{self, ValidationReport};

/// Machine-readable validation result for `--json`.
#[derive(Serialize)]
#[serde(untagged)]
enum JsonResult<'a> {
    Valid {
        valid: bool,
        name: &'a str,
        version: &'a str,
    },
    Invalid {
        valid: bool,
        errors: &'a ValidationReport,
    },
}

/// Execute the validate command.
///
/// Load and schema failures are reported here and turn into a failing
/// exit code rather than an error.
#[instrument(name = "cmd_validate", skip_all)]
pub fn cmd_validate(
    global_json: bool,
    config: &Config,
    cwd: &Utf8Path,
) -> anyhow::Result<ExitCode> {
    let path = cwd.join(&config.files.plugin_manifest);
    debug!(%path, json_output = global_json, "executing validate command");

    let value = match manifest::load_json(&path) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "could not load plugin manifest");
            eprintln!("Error reading plugin.json: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    match validate::validate_manifest(&value) {
        Ok(plugin) => {
            info!(name = %plugin.name, version = %plugin.version, "plugin manifest is valid");
            if global_json {
                let result = JsonResult::Valid {
                    valid: true,
                    name: &plugin.name,
                    version: &plugin.version,
                };
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "{} {} v{} is valid",
                    "✓".if_supports_color(Stream::Stdout, |t| t.green()),
                    plugin.name,
                    plugin.version
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(report) => {
            warn!(issues = report.issues().len(), "plugin manifest is invalid");
            if global_json {
                let result = JsonResult::Invalid {
                    valid: false,
                    errors: &report,
                };
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                eprintln!(
                    "{}",
                    "Plugin validation failed:".if_supports_color(Stream::Stderr, |t| t.red())
                );
                eprintln!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
