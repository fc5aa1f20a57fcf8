//! Checkpoint/restore for a [`Tracker`](crate::tracker::Tracker): the
//! externalizable shape of its `flights` map, and the opaque byte-blob
//! contract callers persist alongside their own replay cursor.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tracker::Flight;

/// The persisted shape of a tracker's bookkeeping. Self-describing (JSON)
/// so schema drift between versions is detectable rather than silently
/// misread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub(crate) flights: HashMap<String, Flight>,
    pub(crate) next_sweep: i64,
}

impl State {
    pub(crate) fn new(flights: HashMap<String, Flight>, next_sweep: i64) -> Self {
        State { flights, next_sweep }
    }

    /// Serializes to the opaque blob callers persist with their replay
    /// checkpoint.
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("State contains no non-serializable types")
    }

    /// Restores a `State` from a blob produced by [`State::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        serde_json::from_slice(bytes).map_err(StateError::Malformed)
    }
}

/// A failed restore never mutates the caller's live tracker: this is
/// returned before any flight is touched.
#[derive(Debug)]
pub enum StateError {
    Malformed(serde_json::Error),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Malformed(e) => write!(f, "malformed tracker state: {e}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Malformed(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_without_touching_caller_state() {
        let err = State::from_bytes(b"not json");
        assert!(err.is_err());
    }
}
