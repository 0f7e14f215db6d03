//! Command Unit Traits
//!
//! A command unit is a named, stateless bundle of entry points. Entry points
//! are plain functions: they run on behalf of no particular instance.

use crate::environment;

/// Entry point signature: the parsed arguments, in order
pub type EntryPoint = fn(&[String]) -> anyhow::Result<()>;

/// Entry point used when a descriptor does not name one
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Unit metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitInfo {
    /// Name the unit is dispatched by
    pub name: String,

    /// Unit version
    pub version: String,

    /// One-line description
    pub description: String,

    /// API version the unit was written against (YYYYMMDD)
    pub api_version: i64,
}

impl UnitInfo {
    /// Metadata targeting the current API version
    pub fn new<S: Into<String>>(name: S, version: S, description: S) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            api_version: environment::api_version(),
        }
    }

    pub fn with_api_version(mut self, api_version: i64) -> Self {
        self.api_version = api_version;
        self
    }
}

/// Interface every dispatchable unit implements
pub trait CommandUnit: Send + Sync {
    /// Get unit metadata
    fn unit_info(&self) -> &UnitInfo;

    /// Look up an entry point by name
    fn entry_point(&self, name: &str) -> Option<EntryPoint>;

    /// Names of the entry points this unit exposes
    fn entry_points(&self) -> Vec<&'static str> {
        Vec::new()
    }
}
