//! Unit Registry
//!
//! Name-keyed table of command units, populated explicitly at startup.

use std::collections::BTreeMap;
use log::debug;
use crate::command::traits::{CommandUnit, UnitInfo};
use crate::environment;
use crate::error::{CoreError, CoreResult};

/// Registry for command units
pub struct UnitRegistry {
    units: BTreeMap<String, Box<dyn CommandUnit>>,
    api_version: i64,
}

impl UnitRegistry {
    /// Create an empty registry for the current API version
    pub fn new() -> Self {
        Self::with_api_version(environment::api_version())
    }

    /// Create an empty registry accepting units of `api_version`'s major version
    pub fn with_api_version(api_version: i64) -> Self {
        Self {
            units: BTreeMap::new(),
            api_version,
        }
    }

    /// Same major version (year) is compatible
    pub fn is_api_compatible(&self, unit_api_version: i64) -> bool {
        environment::major_version(self.api_version) == environment::major_version(unit_api_version)
    }

    /// Register a unit
    pub fn register(&mut self, unit: Box<dyn CommandUnit>) -> CoreResult<()> {
        let info = unit.unit_info();
        validate_name(&info.name)?;

        if !self.is_api_compatible(info.api_version) {
            return Err(CoreError::registry(format!(
                "Unit '{}' has incompatible API version {} (expected major version {})",
                info.name,
                info.api_version,
                environment::major_version(self.api_version)
            )));
        }

        if self.units.contains_key(&info.name) {
            return Err(CoreError::registry(format!("Unit already registered: {}", info.name)));
        }

        debug!("Registering unit '{}' v{}", info.name, info.version);
        self.units.insert(info.name.clone(), unit);
        Ok(())
    }

    /// Get a unit by name
    pub fn get(&self, name: &str) -> Option<&dyn CommandUnit> {
        self.units.get(name).map(|u| u.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Registered unit names, sorted
    pub fn names(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }

    /// Metadata for every registered unit, sorted by name
    pub fn infos(&self) -> Vec<&UnitInfo> {
        self.units.values().map(|u| u.unit_info()).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit names double as file stems, so they must be a single path component
pub fn validate_name(name: &str) -> CoreResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CoreError::registry(format!("Invalid unit name: '{}'", name)))
    }
}
