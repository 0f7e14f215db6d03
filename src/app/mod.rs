//! Application orchestration module
//!
//! [`Core`] is the context object the bootstrap entry owns: it carries the
//! lifecycle state, the interceptor, the unit registry and, once loaded, the
//! configuration. `init` and `invoke` live in `initialization` and
//! `execution` respectively.

pub mod initialization;
pub mod execution;

use std::path::PathBuf;
use crate::cli;
use crate::command::{CommandUnit, UnitLocator, UnitRegistry};
use crate::config::ConfigManager;
use crate::environment::{self, RuntimeInfo};
use crate::error::CoreResult;
use crate::interceptor::{ErrorInterceptor, HookMode};
use crate::lifecycle::{Lifecycle, LifecycleState};

pub use initialization::{configure_logging, load_configuration, resolve_commands_dir};
pub use execution::{print_unit_listing, UnitListing};

/// Inputs that shape a bootstrap run
#[derive(Debug, Clone)]
pub struct CoreOptions {
    /// Application root; default locations are derived from it
    pub root: PathBuf,
    pub config_file: Option<PathBuf>,
    pub config_name: Option<String>,
    pub commands_dir: Option<PathBuf>,
    /// Run directive taking precedence over the configured one
    pub run_override: Option<String>,
    pub runtime: RuntimeInfo,
    pub minimum_api_version: i64,
    pub hook_mode: HookMode,
}

impl CoreOptions {
    /// Options for `root` with detached hooks and the current runtime
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            config_file: None,
            config_name: None,
            commands_dir: None,
            run_override: None,
            runtime: RuntimeInfo::current(),
            minimum_api_version: environment::MINIMUM_API_VERSION,
            hook_mode: HookMode::Detached,
        }
    }

    pub fn with_config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_config_name<S: Into<String>>(mut self, section: S) -> Self {
        self.config_name = Some(section.into());
        self
    }

    pub fn with_commands_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.commands_dir = Some(path.into());
        self
    }

    pub fn with_run<S: Into<String>>(mut self, directive: S) -> Self {
        self.run_override = Some(directive.into());
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeInfo) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_hook_mode(mut self, mode: HookMode) -> Self {
        self.hook_mode = mode;
        self
    }
}

/// Build options from the command line
pub fn core_options(args: &cli::Args) -> CoreOptions {
    let root = args.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut options = CoreOptions::new(root).with_hook_mode(HookMode::Process);
    options.config_file = args.config_file.clone();
    options.config_name = args.config_name.clone();
    options.commands_dir = args.commands_dir.clone();
    options.run_override = args.run.clone();
    options
}

/// Bootstrap context
pub struct Core {
    options: CoreOptions,
    lifecycle: Lifecycle,
    interceptor: ErrorInterceptor,
    registry: UnitRegistry,
    config: Option<ConfigManager>,
    locator: Option<UnitLocator>,
}

impl Core {
    pub fn new(options: CoreOptions, registry: UnitRegistry) -> Self {
        let interceptor = ErrorInterceptor::new(options.hook_mode);
        Self {
            options,
            lifecycle: Lifecycle::new(),
            interceptor,
            registry,
            config: None,
            locator: None,
        }
    }

    pub fn options(&self) -> &CoreOptions {
        &self.options
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn interceptor(&self) -> &ErrorInterceptor {
        &self.interceptor
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Register `units`, reporting each rejection through the interceptor's
    /// recoverable channel. Returns how many were accepted.
    pub fn register_units(&mut self, units: Vec<Box<dyn CommandUnit>>) -> usize {
        let mut accepted = 0;
        for unit in units {
            match self.registry.register(unit) {
                Ok(()) => accepted += 1,
                Err(e) => self.interceptor.on_error("registration", &e),
            }
        }
        accepted
    }

    /// Configuration, once `init` has loaded it
    pub fn config(&self) -> Option<&ConfigManager> {
        self.config.as_ref()
    }

    /// Unit locator, once `init` has resolved the commands directory
    pub fn locator(&self) -> Option<&UnitLocator> {
        self.locator.as_ref()
    }
}

/// Run `init` then `invoke`, once, with no retry
pub fn bootstrap(core: &mut Core) -> CoreResult<()> {
    core.init()?;
    core.invoke()
}

/// Run `init` then print the discovered units instead of dispatching
pub fn list_commands(core: &mut Core) -> CoreResult<()> {
    core.init()?;
    let listing = core.list_units()?;
    print_unit_listing(&listing);
    Ok(())
}
