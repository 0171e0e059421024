//! Network identifier.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which chain the vote registry is run against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Local development chain; time can be advanced by hand.
    Local,
    /// The public test network.
    Rinkeby,
    /// The production network.
    Mainnet,
}

impl Network {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Rinkeby => "rinkeby",
            Self::Mainnet => "mainnet",
        }
    }

    /// Whether the clock may be moved forward manually on this network.
    pub fn allows_time_travel(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl FromStr for Network {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "localhost" | "dev" => Ok(Self::Local),
            "rinkeby" | "test" => Ok(Self::Rinkeby),
            "mainnet" | "live" => Ok(Self::Mainnet),
            _ => Err(TypesError::UnknownNetwork(s.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
