use crate::log;

pub const BLAZING_THRESHOLD: u32 = 5;
pub const MAX_BOOST_PROGRESS: u32 = 100;
const PROGRESS_PER_CONSUMPTION: u32 = MAX_BOOST_PROGRESS / BLAZING_THRESHOLD;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComboUpdate {
    Building,
    BlazingStarted,
    BoostRefreshed,
}

/// Consecutive-consumption counter behind the blitz "blazing" boost.
///
/// Five consumptions in a row start blazing with a full progress bar. From
/// then on the bar drains by one per decay step and each consumption tops it
/// up; an empty bar ends the episode and resets the streak. Only one decay
/// runs per episode.
#[derive(Clone, Debug, Default)]
pub struct ComboTracker {
    consecutive_count: u32,
    boost_progress: u32,
    is_blazing: bool,
    decaying: bool,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consecutive_count(&self) -> u32 {
        self.consecutive_count
    }

    pub fn boost_progress(&self) -> u32 {
        self.boost_progress
    }

    pub fn is_blazing(&self) -> bool {
        self.is_blazing
    }

    pub fn is_decaying(&self) -> bool {
        self.decaying
    }

    pub fn record_consumption(&mut self) -> ComboUpdate {
        if self.is_blazing {
            self.boost_progress = (self.boost_progress + PROGRESS_PER_CONSUMPTION).min(MAX_BOOST_PROGRESS);
            return ComboUpdate::BoostRefreshed;
        }

        self.consecutive_count = (self.consecutive_count + 1).min(BLAZING_THRESHOLD);
        self.boost_progress = PROGRESS_PER_CONSUMPTION * self.consecutive_count;

        if self.consecutive_count == BLAZING_THRESHOLD {
            self.is_blazing = true;
            self.decaying = true;
            log!("Blazing started");
            ComboUpdate::BlazingStarted
        } else {
            ComboUpdate::Building
        }
    }

    /// One decay step; returns whether the boost is still on.
    pub fn decay_step(&mut self) -> bool {
        if !self.decaying {
            return self.is_blazing;
        }

        self.boost_progress = self.boost_progress.saturating_sub(1);
        if self.boost_progress == 0 {
            self.is_blazing = false;
            self.decaying = false;
            self.consecutive_count = 0;
            log!("Blazing ended");
        }
        self.is_blazing
    }

    pub fn force_clear(&mut self) {
        *self = Self::default();
    }
}
