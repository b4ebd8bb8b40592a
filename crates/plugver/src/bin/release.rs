//! plugver-release: bump the plugin version and stub a changelog entry.
#![deny(unsafe_code)]

use plugver::commands::release::cmd_release;
use plugver::session::Session;
use plugver::{ReleaseCli, parse_or_exit};

fn main() -> anyhow::Result<()> {
    let cli: ReleaseCli = parse_or_exit();
    let session = Session::start(&cli.global)?;

    let result = cmd_release(
        cli.kind,
        cli.dry_run,
        cli.global.json,
        &session.config,
        &session.cwd,
    );
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
