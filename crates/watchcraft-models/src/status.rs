use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Viewing status of a watchlist entry
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum WatchStatus {
    /// On the list, nobody has started it yet
    #[default]
    NotStarted,
    /// First viewing in progress
    Watching,
    /// Watching again after having completed it
    Rewatching,
    /// Paused
    OnHold,
    /// Finished
    Completed,
    /// Finished and queued for another viewing
    ToRewatch,
}

impl WatchStatus {
    pub const ALL: [WatchStatus; 6] = [
        WatchStatus::NotStarted,
        WatchStatus::Watching,
        WatchStatus::Rewatching,
        WatchStatus::OnHold,
        WatchStatus::Completed,
        WatchStatus::ToRewatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::NotStarted => "not-started",
            WatchStatus::Watching => "watching",
            WatchStatus::Rewatching => "rewatching",
            WatchStatus::OnHold => "on-hold",
            WatchStatus::Completed => "completed",
            WatchStatus::ToRewatch => "to-rewatch",
        }
    }

    /// Human label, as shown next to an entry
    pub fn label(&self) -> &'static str {
        match self {
            WatchStatus::NotStarted => "not started",
            WatchStatus::Watching => "currently watching",
            WatchStatus::Rewatching => "currently rewatching",
            WatchStatus::OnHold => "on hold",
            WatchStatus::Completed => "completed",
            WatchStatus::ToRewatch => "to rewatch",
        }
    }

    /// True once the owner has begun (or finished) the entry
    pub fn is_started(&self) -> bool {
        !matches!(self, WatchStatus::NotStarted)
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = ModelError;

    /// Accepts both the kebab-case names and the human labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        WatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized || status.label() == normalized)
            .ok_or_else(|| ModelError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_not_started() {
        assert_eq!(WatchStatus::default(), WatchStatus::NotStarted);
        assert!(!WatchStatus::default().is_started());
    }

    #[test]
    fn test_parse_accepts_names_and_labels() {
        assert_eq!("on-hold".parse::<WatchStatus>(), Ok(WatchStatus::OnHold));
        assert_eq!("currently watching".parse::<WatchStatus>(), Ok(WatchStatus::Watching));
        assert_eq!(" To Rewatch ".parse::<WatchStatus>(), Ok(WatchStatus::ToRewatch));
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        assert_eq!(
            "dropped".parse::<WatchStatus>(),
            Err(ModelError::UnknownStatus("dropped".to_string()))
        );
        assert!(serde_json::from_str::<WatchStatus>("\"dropped\"").is_err());
    }

    #[test]
    fn test_serialization_uses_kebab_case() {
        let json = serde_json::to_string(&WatchStatus::ToRewatch).unwrap();
        assert_eq!(json, "\"to-rewatch\"");
    }
}
