use super::EntryStatus;
use serde::{Deserialize, Serialize};

/// Streak counters as a plain value. Each entry produces the next state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive GREEN days ending at the latest entry
    pub streak: u32,
    pub best_streak: u32,
    pub green_days: u32,
    pub red_days: u32,
}

impl StreakState {
    pub fn record(self, status: EntryStatus) -> Self {
        let mut next = self;
        match status {
            EntryStatus::Green => {
                next.streak += 1;
                next.green_days += 1;
            }
            EntryStatus::Red => {
                next.streak = 0;
                next.red_days += 1;
            }
        }
        next.best_streak = next.best_streak.max(next.streak);
        next
    }

    pub fn replay(statuses: impl IntoIterator<Item = EntryStatus>) -> Self {
        statuses
            .into_iter()
            .fold(Self::default(), |state, s| state.record(s))
    }
}
