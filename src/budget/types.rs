//! Budget edit session type definitions

use crate::errors::{FinanceError, Result};
use serde::{Deserialize, Serialize};

/// Edit session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// No edit in progress; persisted values are authoritative
    Idle,

    /// A working set exists and may diverge from persisted values
    Editing,

    /// Changed items are being written to the record store
    Committing,

    /// Working set discarded, about to return to Idle
    Cancelled,
}

/// Events that move a session between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Start editing from persisted values
    Begin,

    /// Save requested
    Save,

    /// Commit ended, successfully or not
    Finish,

    /// Discard the working set
    Cancel,

    /// Cancellation handled
    Settle,
}

impl SessionState {
    /// Attempt a state transition
    ///
    /// Valid transitions:
    /// 1. Idle       → Editing     (on: Begin)
    /// 2. Editing    → Committing  (on: Save)
    /// 3. Committing → Idle        (on: Finish)
    /// 4. Editing    → Cancelled   (on: Cancel)
    /// 5. Cancelled  → Idle        (on: Settle)
    pub fn transition(&self, event: SessionEvent) -> Result<SessionState> {
        use SessionEvent::*;
        use SessionState::*;

        let next = match (self, event) {
            (Idle, Begin) => Editing,
            (Editing, Save) => Committing,
            (Committing, Finish) => Idle,
            (Editing, Cancel) => Cancelled,
            (Cancelled, Settle) => Idle,
            (from, event) => {
                return Err(FinanceError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                    reason: format!("No valid transition from {:?} on {:?}", from, event),
                });
            }
        };

        Ok(next)
    }

    /// Whether proposed values may be changed
    pub fn is_editing(&self) -> bool {
        matches!(self, SessionState::Editing)
    }
}

/// Outcome of a successful commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    /// Ids written, in write order
    pub written: Vec<String>,

    /// Items whose value did not change
    pub unchanged: usize,
}
