use std::collections::HashMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::{Session, SessionStatus};

/// Terminal-session counts for one ISO calendar week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub week_label: String,
    pub total_sessions: u32,
    pub completed_sessions: u32,
    pub overdue_sessions: u32,
    pub interrupted_sessions: u32,
}

/// Groups sessions by the ISO week their terminal timestamp falls in.
///
/// Sessions that have not reached a terminal state have nothing to bucket by
/// and are excluded. Weeks with no terminal sessions are omitted. Buckets are
/// ordered most recent week first.
pub fn aggregate_by_week(sessions: &[Session]) -> Vec<WeeklyBucket> {
    let mut buckets: HashMap<(i32, u32), WeeklyBucket> = HashMap::new();

    for session in sessions {
        if !session.status.is_terminal() {
            continue;
        }
        let Some(ended_at) = session.ended_at else {
            continue;
        };

        let week = ended_at.iso_week();
        let key = (week.year(), week.week());
        let bucket = buckets.entry(key).or_insert_with(|| WeeklyBucket {
            week_label: format!("{}-W{:02}", week.year(), week.week()),
            total_sessions: 0,
            completed_sessions: 0,
            overdue_sessions: 0,
            interrupted_sessions: 0,
        });

        bucket.total_sessions += 1;
        match session.status {
            SessionStatus::Completed => bucket.completed_sessions += 1,
            SessionStatus::Overdue => bucket.overdue_sessions += 1,
            SessionStatus::Interrupted => bucket.interrupted_sessions += 1,
            _ => {}
        }
    }

    let mut keys: Vec<(i32, u32)> = buckets.keys().copied().collect();
    keys.sort_unstable_by(|a, b| b.cmp(a));

    keys.into_iter()
        .filter_map(|key| buckets.remove(&key))
        .collect()
}
