use std::sync::{Mutex, PoisonError};

use tracing::info;

use crate::types::ReleaseWeek;

/// Tracks the release week the loaded catalog belongs to.
///
/// The first observation sets the baseline. Later observations only compare,
/// so a detected change keeps reporting `true` until a reload calls
/// [`ReleaseWeekTracker::rebase`].
#[derive(Debug, Default)]
pub struct ReleaseWeekTracker {
    baseline: Mutex<Option<ReleaseWeek>>,
}

impl ReleaseWeekTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `week` differs from the baseline. Always `false` (and
    /// records the baseline) when no baseline exists yet.
    pub fn observe(&self, week: &ReleaseWeek) -> bool {
        let mut baseline = self.baseline.lock().unwrap_or_else(PoisonError::into_inner);
        match baseline.as_ref() {
            None => {
                info!("Loaded week: {week}");
                *baseline = Some(week.clone());
                false
            }
            Some(current) => current != week,
        }
    }

    /// Adopt `week` as the baseline once a catalog for it has been fetched.
    pub fn rebase(&self, week: &ReleaseWeek) {
        let mut baseline = self.baseline.lock().unwrap_or_else(PoisonError::into_inner);
        if baseline.as_ref() != Some(week) {
            info!("Release week is now {week}");
            *baseline = Some(week.clone());
        }
    }

    pub fn baseline(&self) -> Option<ReleaseWeek> {
        self.baseline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
