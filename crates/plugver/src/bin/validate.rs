//! plugver-validate: check the plugin manifest against its schema.
#![deny(unsafe_code)]

use std::process::ExitCode;

use plugver::commands::validate::cmd_validate;
use plugver::session::Session;
use plugver::{ValidateCli, parse_or_exit};

fn main() -> anyhow::Result<ExitCode> {
    let cli: ValidateCli = parse_or_exit();
    let session = Session::start(&cli.global)?;

    let result = cmd_validate(cli.global.json, &session.config, &session.cwd);
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
