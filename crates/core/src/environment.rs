//! Build/runtime environment flag.

use std::str::FromStr;

use crate::error::CoreError;

/// Deployment environment. Only `Development` enables the fixed
/// location fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(CoreError::UnknownEnvironment(other.to_string())),
        }
    }
}
