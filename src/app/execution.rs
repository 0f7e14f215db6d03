//! Command dispatch

use std::path::PathBuf;
use log::info;
use crate::app::Core;
use crate::command::Resolver;
use crate::directive::RunDirective;
use crate::error::{CoreError, CoreResult};
use crate::lifecycle::LifecycleState;

/// One line of `--list-commands` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitListing {
    pub name: String,
    pub description: String,
    pub entry: String,
    pub path: Option<PathBuf>,
    pub registered: bool,
}

impl Core {
    /// Dispatch the run directive.
    ///
    /// Only acts in the `Invoke` state. Moves to `Success` when the entry
    /// point returns normally and to `Failed` on any error, which is then
    /// propagated unchanged.
    pub fn invoke(&mut self) -> CoreResult<()> {
        if !self.lifecycle.require(LifecycleState::Invoke, "invoke") {
            return Ok(());
        }

        match self.dispatch() {
            Ok(()) => {
                self.lifecycle.checkpoint(LifecycleState::Success);
                Ok(())
            }
            Err(e) => {
                self.lifecycle.checkpoint(LifecycleState::Failed);
                Err(e)
            }
        }
    }

    /// The run directive currently in effect
    pub fn run_directive(&self) -> Option<&str> {
        self.options
            .run_override
            .as_deref()
            .or_else(|| self.config.as_ref().and_then(|c| c.run_directive()))
    }

    fn dispatch(&self) -> CoreResult<()> {
        let directive = RunDirective::parse(self.run_directive())?;
        let locator = self
            .locator
            .as_ref()
            .ok_or_else(|| CoreError::configuration("commands directory not resolved"))?;

        let resolved = Resolver::new(locator, &self.registry).resolve(&directive.command)?;

        info!(
            "Invoking {}::{} with {} argument(s)",
            resolved.name,
            resolved.entry_name,
            directive.arguments.len()
        );
        (resolved.entry)(&directive.arguments)
            .map_err(|e| CoreError::command_failed(resolved.name.as_str(), e))?;

        info!("Command '{}' completed", resolved.name);
        Ok(())
    }

    /// Descriptors found in the commands directory, followed by registered
    /// units that have no descriptor. Requires the `Invoke` state.
    pub fn list_units(&self) -> CoreResult<Vec<UnitListing>> {
        if !self.lifecycle.require(LifecycleState::Invoke, "list_units") {
            return Ok(Vec::new());
        }
        let locator = self
            .locator
            .as_ref()
            .ok_or_else(|| CoreError::configuration("commands directory not resolved"))?;

        let descriptors = match locator.discover() {
            Ok(descriptors) => descriptors,
            Err(e) => {
                self.interceptor.on_error("discovery", &format!("{:#}", e));
                Vec::new()
            }
        };
        let mut listing: Vec<UnitListing> = descriptors
            .iter()
            .map(|descriptor| {
                let registered = self.registry.get(&descriptor.name);
                UnitListing {
                    name: descriptor.name.clone(),
                    description: descriptor
                        .description
                        .clone()
                        .or_else(|| registered.map(|u| u.unit_info().description.clone()))
                        .unwrap_or_default(),
                    entry: descriptor.entry_point().to_string(),
                    path: descriptor.file_path.clone(),
                    registered: registered.is_some(),
                }
            })
            .collect();

        for info in self.registry.infos() {
            if !listing.iter().any(|l| l.name == info.name) {
                listing.push(UnitListing {
                    name: info.name.clone(),
                    description: info.description.clone(),
                    entry: String::new(),
                    path: None,
                    registered: true,
                });
            }
        }

        Ok(listing)
    }
}

pub fn print_unit_listing(listing: &[UnitListing]) {
    if listing.is_empty() {
        println!("No command units found.");
        return;
    }

    let width = listing.iter().map(|l| l.name.len()).max().unwrap_or(0);
    for unit in listing {
        let status = match (unit.registered, unit.path.is_some()) {
            (true, true) => "",
            (true, false) => " [no descriptor]",
            (false, _) => " [not registered]",
        };
        println!("  {:<width$}  {}{}", unit.name, unit.description, status, width = width);
    }
}
