//! Preview session state machine and debounce.
//!
//! Pure time-passing logic: the host loop feeds events and polls with its
//! own clock. Nothing here spawns threads, sleeps or touches image data, so
//! the transitions are testable with synthetic instants.

use std::time::{Duration, Instant};

/// Default quiescence interval before a parameter change triggers a preview
/// recomputation.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(300);

/// Delays recomputation until input has been quiet for a fixed interval.
///
/// A new trigger replaces any pending one, so a burst of slider changes
/// costs a single recomputation after the burst settles.
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    quiescence: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiescence: Duration) -> Self {
        Self {
            quiescence,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the deadline at `now + quiescence`.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiescence);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once when the armed deadline has passed.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// What the session is currently showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Idle,
    Previewing,
    Inspecting,
}

/// Host-originated events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    ParameterChanged,
    OverlayModeChanged,
    InspectionRequested,
    InspectionFinished,
}

/// What the host should do in response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Re-run segmentation preview for the current capture.
    RecomputePreview,
    /// Redraw existing overlays without recomputation.
    Redraw,
    /// Run a full inspection pass.
    RunInspection,
}

/// Debounced preview/inspection session.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    mode: Mode,
    debounce: Debouncer,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_QUIESCENCE)
    }
}

impl Session {
    pub fn new(quiescence: Duration) -> Self {
        Self {
            mode: Mode::Idle,
            debounce: Debouncer::new(quiescence),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Feed one event; the returned action is performed immediately.
    pub fn handle(&mut self, event: Event, now: Instant) -> Option<Action> {
        match event {
            Event::ParameterChanged => {
                self.debounce.trigger(now);
                None
            }
            Event::OverlayModeChanged => Some(Action::Redraw),
            Event::InspectionRequested => {
                // an inspection run subsumes any pending preview
                self.debounce.cancel();
                self.mode = Mode::Inspecting;
                Some(Action::RunInspection)
            }
            Event::InspectionFinished => {
                self.mode = Mode::Previewing;
                None
            }
        }
    }

    /// Advance the debounce clock. Emits a preview action once input has
    /// been quiet for the quiescence interval; inspection runs are atomic,
    /// so nothing fires while one is in progress.
    pub fn poll(&mut self, now: Instant) -> Option<Action> {
        if self.mode == Mode::Inspecting {
            return None;
        }
        if self.debounce.ready(now) {
            self.mode = Mode::Previewing;
            Some(Action::RecomputePreview)
        } else {
            None
        }
    }
}
