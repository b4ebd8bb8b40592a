//! Process startup shared by both binaries.

use anyhow::{Context, anyhow};
use camino::Utf8PathBuf;
use plugver_core::config::{Config, ConfigLoader};
use tracing::debug;

use crate::GlobalArgs;
use crate::observability::{self, ObservabilityConfig, ObservabilityGuard};

/// Everything a command needs once flags have been applied.
pub struct Session {
    /// Working directory after `-C`.
    pub cwd: Utf8PathBuf,
    /// Merged configuration.
    pub config: Config,
    _guard: ObservabilityGuard,
}

impl Session {
    /// Apply global flags, load configuration, and start logging.
    pub fn start(global: &GlobalArgs) -> anyhow::Result<Self> {
        global.color.apply();

        if let Some(ref dir) = global.chdir {
            std::env::set_current_dir(dir)
                .with_context(|| format!("failed to change directory to {}", dir.display()))?;
        }

        let cwd = std::env::current_dir().context("failed to determine current directory")?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
            anyhow!(
                "current directory is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;

        let mut loader = ConfigLoader::new().with_project_search(&cwd);
        if let Some(ref config_path) = global.config {
            let config_path = Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
                anyhow!(
                    "config path is not valid UTF-8: {}",
                    e.into_path_buf().display()
                )
            })?;
            loader = loader.with_file(&config_path);
        }
        let config = loader.load().context("failed to load configuration")?;

        let obs = ObservabilityConfig::new(
            config
                .log_dir
                .as_ref()
                .map(|dir| dir.as_std_path().to_path_buf()),
        );
        let filter =
            observability::env_filter(global.quiet, global.verbose, config.log_level.as_str());
        let guard = observability::init_observability(&obs, filter)
            .context("failed to initialize logging")?;

        debug!(
            verbose = global.verbose,
            quiet = global.quiet,
            json = global.json,
            color = ?global.color,
            chdir = ?global.chdir,
            "CLI initialized"
        );

        Ok(Self {
            cwd,
            config,
            _guard: guard,
        })
    }
}
