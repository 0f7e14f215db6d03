pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod directive;
pub mod environment;
pub mod error;
pub mod interceptor;
pub mod lifecycle;
pub mod logging;

pub use app::{bootstrap, Core, CoreOptions};
pub use error::{CoreError, CoreResult, ResolutionError};
pub use lifecycle::LifecycleState;
