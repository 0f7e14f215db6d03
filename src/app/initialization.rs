//! Application initialization and configuration

use anyhow::Result;
use std::path::PathBuf;
use log::{debug, info};
use crate::app::{Core, CoreOptions};
use crate::command::UnitLocator;
use crate::config::{ConfigManager, BASE_SECTION};
use crate::environment;
use crate::error::{CoreError, CoreResult};
use crate::lifecycle::LifecycleState;
use crate::{cli, logging};

impl Core {
    /// Bring the core from `Init` to `Invoke`.
    ///
    /// Checks the runtime environment, installs the error interceptor and
    /// loads configuration, in that order. Calling it in any other state is a
    /// logged no-op. An environment failure leaves the state untouched; a
    /// configuration failure moves it to `Failed`.
    pub fn init(&mut self) -> CoreResult<()> {
        if !self.lifecycle.require(LifecycleState::Init, "init") {
            return Ok(());
        }

        let runtime = &self.options.runtime;
        info!("Loading {} {}", runtime.name, runtime.version);
        environment::check_environment(runtime, self.options.minimum_api_version)?;

        info!("Installing error interceptor.");
        self.interceptor.install();

        info!("Loading configuration.");
        let config = match load_configuration(&self.options) {
            Ok(config) => config,
            Err(e) => {
                self.lifecycle.checkpoint(LifecycleState::Failed);
                return Err(e);
            }
        };

        let locator = UnitLocator::new(resolve_commands_dir(&self.options, &config));
        info!("Commands directory: {}", locator.base_dir().display());
        self.report_discovery(&locator);

        self.config = Some(config);
        self.locator = Some(locator);
        self.lifecycle.checkpoint(LifecycleState::Invoke);
        Ok(())
    }

    /// Log what the commands directory offers; problems are recoverable
    fn report_discovery(&self, locator: &UnitLocator) {
        match locator.discover() {
            Ok(descriptors) => {
                debug!(
                    "Discovered {} unit descriptor(s), {} unit(s) registered",
                    descriptors.len(),
                    self.registry.len()
                );
                for descriptor in descriptors.iter().filter(|d| !self.registry.contains(&d.name)) {
                    self.interceptor.on_error(
                        "discovery",
                        &format!("descriptor for '{}' has no registered unit", descriptor.name),
                    );
                }
            }
            Err(e) => self.interceptor.on_error("discovery", &format!("{:#}", e)),
        }
    }
}

pub fn load_configuration(options: &CoreOptions) -> CoreResult<ConfigManager> {
    let loaded = if let Some(config_file) = &options.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        ConfigManager::load_from_file(config_file.clone())
    } else {
        ConfigManager::load(&options.root)
    };
    let mut manager = loaded.map_err(|e| CoreError::configuration(format!("{:#}", e)))?;

    if let Some(section_name) = &options.config_name {
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

/// Precedence: explicit option > `commands-dir` config key > `<root>/commands`.
/// Relative configured paths are taken from the root.
pub fn resolve_commands_dir(options: &CoreOptions, config: &ConfigManager) -> PathBuf {
    if let Some(dir) = &options.commands_dir {
        return dir.clone();
    }
    match config.get_path(BASE_SECTION, "commands-dir") {
        Some(dir) if dir.is_relative() => options.root.join(dir),
        Some(dir) => dir,
        None => options.root.join("commands"),
    }
}

pub fn configure_logging(args: &cli::Args) -> Result<logging::LogConfig> {
    use log::LevelFilter;
    use std::str::FromStr;

    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };

    let format = logging::LogFormat::from_str(&args.log_format)
        .map_err(|e| anyhow::anyhow!(e))?;

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => None,
    };

    let (destination, file_level) = match (args.log_file.as_ref(), file_log_level) {
        (Some(file_path), Some(level)) => {
            (logging::LogDestination::Both(file_path.clone()), Some(level))
        }
        (Some(file_path), None) => {
            (logging::LogDestination::Both(file_path.clone()), Some(console_level))
        }
        (None, None) => (logging::LogDestination::Console, None),
        (None, Some(_)) => {
            return Err(anyhow::anyhow!("Log file level specified without log file"));
        }
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}
