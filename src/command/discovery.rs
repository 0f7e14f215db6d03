//! Unit Discovery
//!
//! Maps command names onto the on-disk naming convention
//! `<commands-dir>/<name>.toml` and scans that directory for descriptors.
//!
//! A descriptor looks like:
//!
//! ```toml
//! [unit]
//! name = "echo"
//! description = "Print the arguments"
//! entry = "main"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::Deserialize;
use log::debug;
use crate::command::traits::DEFAULT_ENTRY_POINT;

/// File suffix for unit descriptors
pub const UNIT_SUFFIX: &str = "toml";

#[derive(Debug, Deserialize)]
struct DescriptorFile {
    unit: Option<UnitDescriptor>,
}

/// Contents of a unit descriptor file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnitDescriptor {
    /// Unit the file defines
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Entry point to invoke
    #[serde(default)]
    pub entry: Option<String>,

    /// Where the descriptor was read from
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

impl UnitDescriptor {
    /// Entry point name, falling back to the default
    pub fn entry_point(&self) -> &str {
        self.entry.as_deref().unwrap_or(DEFAULT_ENTRY_POINT)
    }
}

/// Outcome of loading a descriptor file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedDescriptor {
    /// The file defines a unit
    Defined(UnitDescriptor),
    /// The file parsed (or failed to) without defining any unit
    Undefined(String),
}

/// Resolves unit names to descriptor locations
#[derive(Debug, Clone)]
pub struct UnitLocator {
    base_dir: PathBuf,
}

impl UnitLocator {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Conventional location of a unit's descriptor
    pub fn locate(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.{}", name, UNIT_SUFFIX))
    }

    /// Read and parse the descriptor at `path`
    pub fn load(&self, path: &Path) -> Result<LoadedDescriptor> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read unit descriptor: {}", path.display()))?;

        Ok(match toml::from_str::<DescriptorFile>(&content) {
            Ok(DescriptorFile { unit: Some(mut descriptor) }) => {
                descriptor.file_path = Some(path.to_path_buf());
                LoadedDescriptor::Defined(descriptor)
            }
            Ok(DescriptorFile { unit: None }) => {
                LoadedDescriptor::Undefined("no [unit] table".to_string())
            }
            Err(e) => LoadedDescriptor::Undefined(format!("invalid descriptor: {}", e.message())),
        })
    }

    /// Scan the base directory for descriptors that define a unit.
    ///
    /// Files that do not define a unit or cannot be read are skipped; results
    /// are sorted by name. Only an unreadable directory is an error.
    pub fn discover(&self) -> Result<Vec<UnitDescriptor>> {
        let entries = fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read commands directory: {}", self.base_dir.display()))?;

        let mut descriptors = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read entry in {}", self.base_dir.display()))?
                .path();

            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some(UNIT_SUFFIX) {
                continue;
            }

            match self.load(&path) {
                Ok(LoadedDescriptor::Defined(descriptor)) => descriptors.push(descriptor),
                Ok(LoadedDescriptor::Undefined(reason)) => {
                    debug!("Skipping {}: {}", path.display(), reason);
                }
                Err(e) => debug!("Skipping {}: {:#}", path.display(), e),
            }
        }

        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(descriptors)
    }
}
