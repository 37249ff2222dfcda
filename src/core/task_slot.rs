//! Single-slot guard serializing backend operations
//!
//! At most one fetch or download runs at a time. The frontend disables its
//! buttons while an operation is in flight; the backend enforces the same
//! rule with an atomic flag, independent of presentation state.

use std::sync::atomic::{AtomicBool, Ordering};

/// One-deep task slot shared by every command handler
#[derive(Debug, Default)]
pub struct TaskSlot {
    busy: AtomicBool,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Claim the slot. Returns `None` while another operation holds it.
    pub fn try_acquire(&self) -> Option<TaskPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TaskPermit { slot: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Permit handed out by [`TaskSlot::try_acquire`]; the slot frees itself when
/// the permit drops, on success and on every error path alike.
#[derive(Debug)]
pub struct TaskPermit<'a> {
    slot: &'a TaskSlot,
}

impl Drop for TaskPermit<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}
