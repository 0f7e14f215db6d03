//! Command Unit System
//!
//! Command units are registered explicitly at startup and resolved by name
//! through descriptor files laid out by convention:
//!
//! ```no_run
//! use bootcore::command::{builtin, Resolver, UnitLocator, UnitRegistry};
//!
//! let mut registry = UnitRegistry::new();
//! for unit in builtin::builtin_units() {
//!     registry.register(unit).unwrap();
//! }
//!
//! let locator = UnitLocator::new("commands");
//! let resolved = Resolver::new(&locator, &registry).resolve("echo").unwrap();
//! (resolved.entry)(&["hello".to_string()]).unwrap();
//! ```

pub mod traits;
pub mod registry;
pub mod discovery;
pub mod resolver;
pub mod builtin;

pub use traits::{CommandUnit, EntryPoint, UnitInfo, DEFAULT_ENTRY_POINT};
pub use registry::UnitRegistry;
pub use discovery::{LoadedDescriptor, UnitDescriptor, UnitLocator, UNIT_SUFFIX};
pub use resolver::{ResolvedUnit, Resolver};
