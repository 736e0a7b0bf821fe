//! Per-instance interaction state shared by every event handler of one map.
//!
//! All handlers of a map run on one event loop; the mutex only guards against
//! a host that moves them across threads, never against logical interleaving.

use crate::layers::marker::MarkerId;
use std::sync::{Arc, Mutex, MutexGuard};

/// Details panel lifecycle: `Closed -> Open -> Closing -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Open,
    /// Slid out, waiting for the close animation before counting as closed.
    Closing,
}

impl PanelState {
    /// The panel's "open" flag: true until a pending close has completed.
    pub fn is_open(&self) -> bool {
        !matches!(self, PanelState::Closed)
    }
}

#[derive(Debug, Default)]
pub struct MapSession {
    highlighted: Option<MarkerId>,
    panel: PanelState,
    /// Incremented by every `open()`; a delayed close only completes if
    /// the id it captured is still current.
    panel_session: u64,
}

impl MapSession {
    pub fn highlighted(&self) -> Option<MarkerId> {
        self.highlighted
    }

    /// Records `marker` as the highlighted one and returns the marker
    /// that lost its highlight.
    pub fn replace_highlight(&mut self, marker: MarkerId) -> Option<MarkerId> {
        self.highlighted.replace(marker)
    }

    pub fn panel_state(&self) -> PanelState {
        self.panel
    }

    pub fn panel_session(&self) -> u64 {
        self.panel_session
    }

    pub(crate) fn begin_panel_session(&mut self) -> u64 {
        self.panel_session += 1;
        self.panel = PanelState::Open;
        self.panel_session
    }

    pub(crate) fn begin_closing(&mut self) -> u64 {
        self.panel = PanelState::Closing;
        self.panel_session
    }

    /// Completes a close started in `session`. Returns false when a newer
    /// `open()` has superseded it.
    pub(crate) fn finish_closing(&mut self, session: u64) -> bool {
        if self.panel_session != session || self.panel != PanelState::Closing {
            return false;
        }
        self.panel = PanelState::Closed;
        true
    }
}

/// Cloneable handle to one map instance's session
#[derive(Debug, Clone, Default)]
pub struct SharedSession(Arc<Mutex<MapSession>>);

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the session. A poisoned lock is recovered since the state
    /// holds no invariants a panicking handler could break half-way.
    pub fn lock(&self) -> MutexGuard<'_, MapSession> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn highlighted(&self) -> Option<MarkerId> {
        self.lock().highlighted()
    }

    pub fn panel_state(&self) -> PanelState {
        self.lock().panel_state()
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_state().is_open()
    }
}
