//! Focus state shared between the render loop and voice capture tasks
//!
//! The render loop reads the current focus label every frame; a background
//! capture task may overwrite it once per successful voice command. The
//! controller enforces single-flight updates: at most one capture task holds
//! the update slot at any instant, and the slot is released on every exit
//! path via the [`UpdateSlot`] guard's `Drop`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Owns the current focus label and the single-flight update gate
#[derive(Debug)]
pub struct FocusController {
    current: RwLock<String>,
    update_in_flight: AtomicBool,
}

impl FocusController {
    /// Create a controller with the startup focus label
    ///
    /// The initial label is chosen synchronously at startup (voice prompt or
    /// CLI flag) before any capture task exists.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            current: RwLock::new(initial.into()),
            update_in_flight: AtomicBool::new(false),
        })
    }

    /// Non-blocking read of the current focus label
    ///
    /// Safe to call from the render loop every frame. A commit by an
    /// in-flight capture task is observed by some subsequent read, not
    /// necessarily the very next one.
    #[must_use]
    pub fn current_focus(&self) -> String {
        self.current
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Try to acquire the exclusive right to update the focus
    ///
    /// Linearizable check-and-set: of any number of concurrent callers, at
    /// most one receives `Some` while a previous slot is unreleased. Returns
    /// `None` without side effects when an update is already in flight.
    #[must_use]
    pub fn try_acquire_update_slot(self: &Arc<Self>) -> Option<UpdateSlot> {
        self.update_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| UpdateSlot {
                controller: Arc::clone(self),
            })
    }

    /// Whether a capture task currently holds the update slot
    #[must_use]
    pub fn update_in_flight(&self) -> bool {
        self.update_in_flight.load(Ordering::Acquire)
    }

    fn set_focus(&self, label: &str) {
        if let Ok(mut current) = self.current.write() {
            *current = label.to_string();
        }
    }
}

/// Exclusive right to commit a new focus label
///
/// Obtained only through [`FocusController::try_acquire_update_slot`]. The
/// slot is released exactly once when the guard is dropped, whichever way the
/// owning task exits (commit, timeout, unrecognized speech, service error).
/// The spawning loop keeps no handle to the task; dropping this guard is the
/// task's final side effect on shared state.
#[derive(Debug)]
pub struct UpdateSlot {
    controller: Arc<FocusController>,
}

impl UpdateSlot {
    /// Overwrite the current focus with a canonical catalog label
    pub fn commit(&self, label: &str) {
        self.controller.set_focus(label);
        tracing::info!(focus = label, "focus changed");
    }
}

impl Drop for UpdateSlot {
    fn drop(&mut self) {
        self.controller
            .update_in_flight
            .store(false, Ordering::Release);
    }
}
