//! Run directive parsing
//!
//! `"<command-name> [arg ...]"` split on whitespace: the first token names the
//! command, the rest are its arguments in their original order.

use std::fmt;
use std::str::FromStr;
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirective {
    pub command: String,
    pub arguments: Vec<String>,
}

impl RunDirective {
    /// Parse an optional raw directive; absent or blank means nothing to run
    pub fn parse(raw: Option<&str>) -> CoreResult<Self> {
        let mut tokens = raw.unwrap_or_default().split_whitespace();
        let command = tokens.next().ok_or_else(CoreError::nothing_to_run)?;

        Ok(Self {
            command: command.to_string(),
            arguments: tokens.map(str::to_string).collect(),
        })
    }
}

impl FromStr for RunDirective {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(Some(s))
    }
}

impl fmt::Display for RunDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for argument in &self.arguments {
            write!(f, " {}", argument)?;
        }
        Ok(())
    }
}
