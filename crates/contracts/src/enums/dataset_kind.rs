use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Independently mapped and imported data domains of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Financial,
    Portfolio,
}

impl DatasetKind {
    /// Code used in URLs and JSON payloads
    pub fn code(&self) -> &'static str {
        match self {
            DatasetKind::Financial => "financial",
            DatasetKind::Portfolio => "portfolio",
        }
    }

    /// All kinds in import order (financial is always imported first)
    pub fn all() -> Vec<DatasetKind> {
        vec![DatasetKind::Financial, DatasetKind::Portfolio]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "financial" => Some(DatasetKind::Financial),
            "portfolio" => Some(DatasetKind::Portfolio),
            _ => None,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DatasetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetKind::from_code(s).ok_or_else(|| anyhow::anyhow!("Unknown dataset kind: {}", s))
    }
}
