//! Runtime Environment Check
//!
//! The API version is generated at build time from
//! `package.metadata.bootcore.api_version` in Cargo.toml (format YYYYMMDD).
//! Bootstrap refuses to proceed when the running build is older than
//! [`MINIMUM_API_VERSION`].

use log::{debug, info};
use crate::error::{CoreError, CoreResult};

include!(concat!(env!("OUT_DIR"), "/version_api.rs"));

/// Oldest API version the core will bootstrap with
pub const MINIMUM_API_VERSION: i64 = 20260101;

/// Get the API version this build was compiled with
pub fn api_version() -> i64 {
    BASE_API_VERSION
}

/// Major component (year) of a YYYYMMDD API version
pub fn major_version(version: i64) -> i64 {
    version / 10000
}

/// Convert a YYYYMMDD version to a YYYY-MM-DD string
pub fn version_to_date_string(version: i64) -> String {
    if (10000000..=99999999).contains(&version) {
        let year = version / 10000;
        let month = (version % 10000) / 100;
        let day = version % 100;
        format!("{year:04}-{month:02}-{day:02}")
    } else {
        format!("unknown ({version})")
    }
}

/// Description of the running program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub name: String,
    pub version: String,
    pub api_version: i64,
}

impl RuntimeInfo {
    /// Info for the current build
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_version: api_version(),
        }
    }
}

/// Verify `runtime` meets `minimum`. The failure is left for the caller to report.
pub fn check_environment(runtime: &RuntimeInfo, minimum: i64) -> CoreResult<()> {
    info!("Checking runtime environment..");
    if runtime.api_version >= minimum {
        debug!(
            "API version is {} ({}). Fine..",
            runtime.api_version,
            version_to_date_string(runtime.api_version)
        );
        return Ok(());
    }

    let message = format!(
        "API version must be at least {} ({}); this build is {} ({})",
        minimum,
        version_to_date_string(minimum),
        runtime.api_version,
        version_to_date_string(runtime.api_version)
    );
    Err(CoreError::environment(message))
}
