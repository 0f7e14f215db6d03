//! Command Resolution
//!
//! name → descriptor location → defined unit → entry point. Each step has
//! its own failure so callers can tell which one broke.

use std::fmt;
use std::path::PathBuf;
use log::debug;
use crate::command::discovery::{LoadedDescriptor, UnitLocator};
use crate::command::registry::{self, UnitRegistry};
use crate::command::traits::EntryPoint;
use crate::error::{CoreError, CoreResult};

/// A unit ready to invoke
#[derive(Clone)]
pub struct ResolvedUnit {
    pub name: String,
    pub descriptor_path: PathBuf,
    pub entry_name: String,
    pub entry: EntryPoint,
}

impl fmt::Debug for ResolvedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedUnit")
            .field("name", &self.name)
            .field("descriptor_path", &self.descriptor_path)
            .field("entry_name", &self.entry_name)
            .finish_non_exhaustive()
    }
}

/// Resolves command names against the on-disk convention and the registry
pub struct Resolver<'a> {
    locator: &'a UnitLocator,
    registry: &'a UnitRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(locator: &'a UnitLocator, registry: &'a UnitRegistry) -> Self {
        Self { locator, registry }
    }

    pub fn resolve(&self, name: &str) -> CoreResult<ResolvedUnit> {
        let path = self.locator.locate(name);
        debug!("Resolving unit '{}' at {}", name, path.display());

        // Names that are not a single path component can never match a descriptor
        if registry::validate_name(name).is_err() || !path.is_file() {
            return Err(CoreError::unit_not_found(name, path));
        }

        let descriptor = match self.locator.load(&path) {
            Ok(LoadedDescriptor::Defined(descriptor)) => descriptor,
            Ok(LoadedDescriptor::Undefined(reason)) => {
                return Err(CoreError::unit_not_defined(name, reason));
            }
            Err(e) => return Err(CoreError::unit_not_defined(name, format!("{:#}", e))),
        };

        if descriptor.name != name {
            return Err(CoreError::unit_not_defined(
                name,
                format!("descriptor defines '{}'", descriptor.name),
            ));
        }

        let unit = self
            .registry
            .get(name)
            .ok_or_else(|| CoreError::unit_not_defined(name, "no unit registered under this name"))?;

        let entry_name = descriptor.entry_point().to_string();
        let entry = unit
            .entry_point(&entry_name)
            .ok_or_else(|| CoreError::entry_point_not_found(name, entry_name.as_str()))?;

        Ok(ResolvedUnit {
            name: name.to_string(),
            descriptor_path: path,
            entry_name,
            entry,
        })
    }
}
