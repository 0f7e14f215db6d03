//! Built-in command units

use anyhow::Result;
use crate::command::traits::{CommandUnit, EntryPoint, UnitInfo};
use crate::environment;

/// Every built-in unit, ready for registration
pub fn builtin_units() -> Vec<Box<dyn CommandUnit>> {
    vec![
        Box::new(EchoUnit::new()),
        Box::new(ArgsUnit::new()),
        Box::new(VersionUnit::new()),
    ]
}

/// Prints its arguments separated by single spaces
pub struct EchoUnit {
    info: UnitInfo,
}

impl EchoUnit {
    pub fn new() -> Self {
        Self {
            info: UnitInfo::new("echo", env!("CARGO_PKG_VERSION"), "Print the arguments"),
        }
    }

    fn main(args: &[String]) -> Result<()> {
        println!("{}", args.join(" "));
        Ok(())
    }
}

impl Default for EchoUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandUnit for EchoUnit {
    fn unit_info(&self) -> &UnitInfo {
        &self.info
    }

    fn entry_point(&self, name: &str) -> Option<EntryPoint> {
        match name {
            "main" => Some(Self::main),
            _ => None,
        }
    }

    fn entry_points(&self) -> Vec<&'static str> {
        vec!["main"]
    }
}

/// Shows how the arguments were split
pub struct ArgsUnit {
    info: UnitInfo,
}

impl ArgsUnit {
    pub fn new() -> Self {
        Self {
            info: UnitInfo::new("args", env!("CARGO_PKG_VERSION"), "Print each argument with its index"),
        }
    }

    fn main(args: &[String]) -> Result<()> {
        for line in indexed(args) {
            println!("{}", line);
        }
        Ok(())
    }

    fn describe(args: &[String]) -> Result<()> {
        println!("{} argument(s)", args.len());
        Ok(())
    }
}

fn indexed(args: &[String]) -> Vec<String> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| format!("{}: {}", i, arg))
        .collect()
}

impl Default for ArgsUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandUnit for ArgsUnit {
    fn unit_info(&self) -> &UnitInfo {
        &self.info
    }

    fn entry_point(&self, name: &str) -> Option<EntryPoint> {
        match name {
            "main" => Some(Self::main),
            "describe" => Some(Self::describe),
            _ => None,
        }
    }

    fn entry_points(&self) -> Vec<&'static str> {
        vec!["main", "describe"]
    }
}

/// Prints the crate and API version
pub struct VersionUnit {
    info: UnitInfo,
}

impl VersionUnit {
    pub fn new() -> Self {
        Self {
            info: UnitInfo::new("version", env!("CARGO_PKG_VERSION"), "Print version information"),
        }
    }

    fn main(args: &[String]) -> Result<()> {
        if let Some(extra) = args.first() {
            anyhow::bail!("version takes no arguments (got '{}')", extra);
        }
        let api = environment::api_version();
        println!(
            "{} {} (API {}, {})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            api,
            environment::version_to_date_string(api)
        );
        Ok(())
    }
}

impl Default for VersionUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandUnit for VersionUnit {
    fn unit_info(&self) -> &UnitInfo {
        &self.info
    }

    fn entry_point(&self, name: &str) -> Option<EntryPoint> {
        match name {
            "main" => Some(Self::main),
            _ => None,
        }
    }

    fn entry_points(&self) -> Vec<&'static str> {
        vec!["main"]
    }
}
