//! Issue state enum mirroring GitHub's issue lifecycle.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of an issue as reported by GitHub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// Issue is open.
    #[sea_orm(string_value = "open")]
    Open,
    /// Issue has been closed.
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl Default for IssueState {
    fn default() -> Self {
        IssueState::Open
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for IssueState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            _ => Err(format!("Unknown issue state: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(IssueState::Open.to_string(), "open");
        assert_eq!(IssueState::Closed.to_string(), "closed");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("open".parse::<IssueState>().unwrap(), IssueState::Open);
        assert_eq!("Closed".parse::<IssueState>().unwrap(), IssueState::Closed);
        assert!("reopened".parse::<IssueState>().is_err());
    }

    #[test]
    fn test_deserialize_from_payload() {
        let state: IssueState = serde_json::from_str("\"open\"").unwrap();
        assert_eq!(state, IssueState::Open);
        let state: IssueState = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(state, IssueState::Closed);
    }
}
