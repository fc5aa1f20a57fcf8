//! Raw transponder messages recovered from the Beast wire format, before any
//! Mode S/ADS-B interpretation.

use serde::{Deserialize, Serialize};

/// Message length class, mirroring the Beast type tag that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawKind {
    /// 2-byte Mode A/C reply (Beast type `1`).
    ModeAC,
    /// 7-byte Mode S short squitter (Beast type `2`).
    ModeSShort,
    /// 14-byte Mode S extended squitter (Beast type `3`).
    ModeSLong,
}

/// A single de-framed Beast message: an opaque receiver timestamp, a signal
/// level, and the transponder payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub kind: RawKind,
    /// 6-byte MLAT receiver timestamp, opaque to this crate.
    pub timestamp: [u8; 6],
    pub signal: u8,
    pub body: Vec<u8>,
}

impl RawMessage {
    pub fn new(kind: RawKind, timestamp: [u8; 6], signal: u8, body: Vec<u8>) -> Self {
        RawMessage {
            kind,
            timestamp,
            signal,
            body,
        }
    }
}
