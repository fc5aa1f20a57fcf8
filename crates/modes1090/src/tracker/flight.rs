//! Per-aircraft flight state: the running snapshot and the last point
//! actually reported to the sink.

use serde::{Deserialize, Serialize};

use crate::decode::identification::AircraftType;
use crate::decode::position::Position as CprPosition;
use crate::decode::velocity::SpeedType;

/// A point-in-time snapshot of everything known about a flight. Every
/// physical quantity is `Option`-gated: `None` means "not yet observed",
/// never a sentinel value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackPoint {
    pub time: i64,
    pub heading: Option<f64>,
    pub vertical_rate: Option<i32>,
    pub altitude: Option<i32>,
    pub speed: Option<f64>,
    pub speed_type: Option<SpeedType>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub callsign: Option<String>,
    pub category: Option<AircraftType>,
}

/// A retained CPR frame, kept only long enough to pair with its counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CprFrame {
    pub position: CprPosition,
    pub timestamp: i64,
}

/// Live per-aircraft state. Never exists with `message_count == 0`: it is
/// created and immediately attributed its first message in the same step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub icao_id: String,
    pub first_seen: i64,
    pub last_seen: i64,
    pub message_count: u64,
    pub callsign: Option<String>,
    pub category: Option<AircraftType>,
    /// Set whenever `current` has changed since the last emitted point;
    /// cleared on every emission.
    pub pending_change: bool,
    /// The most recently emitted track point; a time-prefix of `current`.
    pub last: TrackPoint,
    /// The running, not-yet-necessarily-reported snapshot.
    pub current: TrackPoint,
    pub even_frame: Option<CprFrame>,
    pub odd_frame: Option<CprFrame>,
}

impl Flight {
    pub fn new(icao_id: String, first_seen: i64) -> Self {
        let point = TrackPoint {
            time: first_seen,
            ..Default::default()
        };
        Flight {
            icao_id,
            first_seen,
            last_seen: first_seen,
            message_count: 0,
            callsign: None,
            category: None,
            pending_change: false,
            last: point.clone(),
            current: point,
            even_frame: None,
            odd_frame: None,
        }
    }
}
