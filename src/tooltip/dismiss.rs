// Outside-click dismissal
//
// The click that opens the popup bubbles up to the document as well. Rather
// than arming the listener after a fixed delay, every interaction carries an
// origin id; the guard remembers the id of the interaction that opened it and
// ignores clicks carrying that same id.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a user interaction (one click, one hover)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractionId(u64);

impl InteractionId {
    /// Allocate a fresh, process-unique id
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        InteractionId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A document-level click as seen by the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub origin: InteractionId,
    /// Click landed inside the popup itself
    pub inside_popup: bool,
}

impl ClickEvent {
    pub fn outside(origin: InteractionId) -> Self {
        Self {
            origin,
            inside_popup: false,
        }
    }

    pub fn inside(origin: InteractionId) -> Self {
        Self {
            origin,
            inside_popup: true,
        }
    }
}

/// Listener state for one popup; armed only while the popup is open
#[derive(Debug, Default)]
pub struct DismissGuard {
    opened_by: Option<InteractionId>,
}

impl DismissGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, opened_by: InteractionId) {
        tracing::trace!(opened_by = opened_by.raw(), "arming outside-click listener");
        self.opened_by = Some(opened_by);
    }

    pub fn disarm(&mut self) {
        if self.opened_by.take().is_some() {
            tracing::trace!("outside-click listener removed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.opened_by.is_some()
    }

    /// Whether a click should close the popup, without changing state
    pub fn should_dismiss(&self, event: &ClickEvent) -> bool {
        match self.opened_by {
            Some(opened_by) => event.origin != opened_by && !event.inside_popup,
            None => false,
        }
    }

    /// Feed a click; returns true and disarms when it dismisses the popup
    pub fn handle_click(&mut self, event: &ClickEvent) -> bool {
        let dismiss = self.should_dismiss(event);
        if dismiss {
            self.disarm();
        }
        dismiss
    }
}

impl Drop for DismissGuard {
    fn drop(&mut self) {
        self.disarm();
    }
}
