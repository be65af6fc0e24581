use super::types::CueEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownStep {
    Number(u32),
    Go,
}

impl CountdownStep {
    pub fn label(&self) -> String {
        match self {
            CountdownStep::Number(n) => n.to_string(),
            CountdownStep::Go => "Go!".to_string(),
        }
    }

    pub fn cue(&self) -> CueEvent {
        match self {
            CountdownStep::Number(_) => CueEvent::CountdownInProgress,
            CountdownStep::Go => CueEvent::CountdownEnd,
        }
    }
}

/// `from, from - 1, .., 1, Go`.
#[derive(Clone, Debug)]
pub struct Countdown {
    next: Option<CountdownStep>,
}

impl Countdown {
    pub fn new(from: u32) -> Self {
        let first = if from == 0 {
            CountdownStep::Go
        } else {
            CountdownStep::Number(from)
        };
        Self { next: Some(first) }
    }
}

impl Iterator for Countdown {
    type Item = CountdownStep;

    fn next(&mut self) -> Option<CountdownStep> {
        let current = self.next?;
        self.next = match current {
            CountdownStep::Number(n) if n > 1 => Some(CountdownStep::Number(n - 1)),
            CountdownStep::Number(_) => Some(CountdownStep::Go),
            CountdownStep::Go => None,
        };
        Some(current)
    }
}

/// Seconds-left bookkeeping for a time-limited match. The tokio interval that
/// drives it lives in the session; this only counts.
#[derive(Clone, Debug)]
pub struct MatchTimer {
    time_limit: Option<u32>,
    elapsed: u32,
    running: bool,
}

impl MatchTimer {
    pub fn new(time_limit: Option<u32>) -> Self {
        Self {
            time_limit,
            elapsed: 0,
            running: false,
        }
    }

    pub fn is_time_limited(&self) -> bool {
        self.time_limit.is_some()
    }

    /// The time-zero emission.
    pub fn start(&mut self) {
        self.elapsed = 0;
        self.running = self.time_limit.is_some();
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// One second passed. Returns the seconds left, `None` when stopped or unlimited.
    pub fn tick_second(&mut self) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.elapsed += 1;
        self.time_left()
    }

    pub fn time_left(&self) -> Option<u32> {
        self.time_limit.map(|limit| limit.saturating_sub(self.elapsed))
    }

    pub fn is_expired(&self) -> bool {
        self.time_left() == Some(0)
    }
}
