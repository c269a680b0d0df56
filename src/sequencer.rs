//! The reveal state machine: `Idle → Loading → Released → Finished`.
//!
//! Time is passed in explicitly (`now` since the event loop started), so the
//! sequencer is deterministic and holds no timers of its own. Whoever drives it
//! schedules a wake-up at [`RevealSequencer::next_deadline`] and calls
//! [`RevealSequencer::poll`].

use core::time::Duration;

use crate::config::RevealTiming;

/// Where the reveal currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealState {
    Idle,
    Loading { progress: u8 },
    Released { at: Duration },
    Finished,
}

/// A time-driven change reported by [`RevealSequencer::poll`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealTransition {
    /// Loading was forced to 100 by the load timeout.
    LoadingComplete,
    Released { at: Duration },
    Finished,
}

#[derive(Clone, Debug)]
pub struct RevealSequencer {
    state: RevealState,
    timing: RevealTiming,
    loading_since: Duration,
    loaded_at: Option<Duration>,
    cancelled: bool,
}

impl RevealSequencer {
    pub fn new(timing: RevealTiming) -> Self {
        RevealSequencer {
            state: RevealState::Idle,
            timing,
            loading_since: Duration::ZERO,
            loaded_at: None,
            cancelled: false,
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn timing(&self) -> &RevealTiming {
        &self.timing
    }

    /// Observed progress: 0 before loading, 100 once released.
    pub fn progress(&self) -> u8 {
        match self.state {
            RevealState::Idle => 0,
            RevealState::Loading { progress } => progress,
            RevealState::Released { .. } | RevealState::Finished => 100,
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self.state, RevealState::Released { .. } | RevealState::Finished)
    }

    pub fn is_finished(&self) -> bool {
        self.state == RevealState::Finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// `Idle → Loading(0)`. Returns false if already started.
    pub fn start(&mut self, now: Duration) -> bool {
        if self.cancelled || self.state != RevealState::Idle {
            return false;
        }
        self.state = RevealState::Loading { progress: 0 };
        self.loading_since = now;
        log::info!("reveal loading");
        true
    }

    /// Report loading progress in percent.
    ///
    /// Values are clamped to 100 and never move progress backwards. Returns
    /// whether the observed progress changed.
    pub fn report_progress(&mut self, percent: u32, now: Duration) -> bool {
        if self.cancelled {
            return false;
        }
        let RevealState::Loading { progress } = self.state else {
            return false;
        };
        let next = percent.min(100) as u8;
        if next <= progress {
            return false;
        }
        self.state = RevealState::Loading { progress: next };
        if next == 100 {
            self.loaded_at = Some(now);
        }
        true
    }

    /// Jump straight to `Loading(100)`, e.g. when there is nothing to load.
    pub fn complete_loading(&mut self, now: Duration) -> bool {
        self.report_progress(100, now)
    }

    /// When the next time-driven transition is due, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.cancelled {
            return None;
        }
        match self.state {
            RevealState::Loading { .. } => match self.loaded_at {
                Some(at) => Some(at + self.timing.release_pause),
                None => self.timing.load_timeout.map(|t| self.loading_since + t),
            },
            RevealState::Released { at } => Some(at + self.timing.settle),
            RevealState::Idle | RevealState::Finished => None,
        }
    }

    /// Apply the first transition due at `now`.
    ///
    /// Call repeatedly until it returns `None` to catch up on several.
    pub fn poll(&mut self, now: Duration) -> Option<RevealTransition> {
        let deadline = self.next_deadline()?;
        if now < deadline {
            return None;
        }
        match self.state {
            RevealState::Loading { .. } if self.loaded_at.is_none() => {
                log::warn!("loading did not complete within {:?}; revealing anyway", self.timing.load_timeout);
                self.complete_loading(now);
                Some(RevealTransition::LoadingComplete)
            }
            RevealState::Loading { .. } => {
                self.state = RevealState::Released { at: now };
                log::info!("reveal released at {:?}", now);
                Some(RevealTransition::Released { at: now })
            }
            RevealState::Released { .. } => {
                self.state = RevealState::Finished;
                log::info!("reveal finished at {:?}", now);
                Some(RevealTransition::Finished)
            }
            RevealState::Idle | RevealState::Finished => None,
        }
    }

    /// Stop for good; nothing transitions after this.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}
