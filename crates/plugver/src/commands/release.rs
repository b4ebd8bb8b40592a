//! Release command: thin CLI layer over `plugver_core::release`.

use anyhow::Context;
use camino::Utf8Path;
use owo_colors::{OwoColorize, Stream::Stdout};
use tracing::{debug, instrument};

use plugver_core::BumpLevel;
use plugver_core::config::Config;
use plugver_core::release::{self, ReleasePlan};

/// Execute the release command.
#[instrument(name = "cmd_release", skip_all, fields(%level, dry_run = dry_run))]
pub fn cmd_release(
    level: BumpLevel,
    dry_run: bool,
    global_json: bool,
    config: &Config,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing release command");

    let today = chrono::Utc::now().date_naive();
    let plan = release::plan_release(cwd, &config.files, level, today)
        .context("release planning failed")?;

    if dry_run {
        return show_dry_run(&plan, global_json);
    }

    if !global_json {
        println!(
            "Bumping version: {} → {}",
            plan.previous.if_supports_color(Stdout, |v| v.dimmed()),
            plan.next.if_supports_color(Stdout, |v| v.green())
        );
        println!();
    }

    let outcome = plan
        .execute(|file| {
            if !global_json {
                println!(
                    "  {} Updated {}",
                    "✓".if_supports_color(Stdout, |t| t.green()),
                    file.display
                );
            }
        })
        .context("release failed")?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    println!(
        "Version {} prepared",
        outcome
            .new
            .if_supports_color(Stdout, |v| v.green().bold().to_string())
    );
    println!();
    println!("{}", "Next steps:".if_supports_color(Stdout, |t| t.bold()));
    println!("  1. Edit {} to add actual changes", config.files.changelog);
    println!("  2. git add -A && git commit -m \"{}\"", outcome.commit_message);
    println!("  3. git tag {}", outcome.tag);
    println!("  4. git push && git push --tags");

    Ok(())
}

fn show_dry_run(plan: &ReleasePlan, global_json: bool) -> anyhow::Result<()> {
    if global_json {
        let files: Vec<_> = plan
            .files
            .iter()
            .map(|f| serde_json::json!({ "role": f.role, "path": f.display }))
            .collect();
        let plan_json = serde_json::json!({
            "previous": plan.previous.to_string(),
            "next": plan.next.to_string(),
            "level": plan.level,
            "date": plan.date.format("%Y-%m-%d").to_string(),
            "files": files,
            "dry_run": true,
        });
        println!("{}", serde_json::to_string_pretty(&plan_json)?);
        return Ok(());
    }

    println!(
        "Bumping version: {} → {}",
        plan.previous.if_supports_color(Stdout, |v| v.dimmed()),
        plan.next.if_supports_color(Stdout, |v| v.green())
    );
    println!();
    for file in &plan.files {
        println!(
            "  {} Would update {}",
            "→".if_supports_color(Stdout, |t| t.dimmed()),
            file.display
        );
    }
    println!();
    println!(
        "{}",
        "Dry run: no changes made.".if_supports_color(Stdout, |t| t.yellow())
    );
    Ok(())
}
