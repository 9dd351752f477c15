use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pause/resume interval with the reason the user gave.
///
/// Entries are append-only; `resumed_at` is `None` exactly while the session
/// is paused on this entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseEntry {
    pub reason: String,
    pub paused_at: DateTime<Utc>,
    pub resumed_at: Option<DateTime<Utc>>,
}

impl PauseEntry {
    pub fn open(reason: String, paused_at: DateTime<Utc>) -> Self {
        Self {
            reason,
            paused_at,
            resumed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.resumed_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_is_open() {
        let entry = PauseEntry::open("coffee".to_string(), Utc::now());

        assert!(entry.is_open());
        assert_eq!(entry.reason, "coffee");
    }

    #[test]
    fn closed_entry_is_not_open() {
        let mut entry = PauseEntry::open("phone call".to_string(), Utc::now());
        entry.resumed_at = Some(Utc::now());

        assert!(!entry.is_open());
    }
}
