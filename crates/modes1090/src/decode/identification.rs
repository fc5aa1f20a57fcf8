//! Aircraft identification (TC 1-4): callsign and wake/category.

use serde::{Deserialize, Serialize};

/// ICAO Doc 9871 Table A-2-8 wake-vortex / emitter category, keyed by the
/// typecode and the 3-bit emitter category sub-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AircraftType {
    Unknown,
    SurfaceEmergencyVehicle,
    SurfaceServiceVehicle,
    Obstruction,
    ClusterObstacle,
    LineObstacle,
    Glider,
    LighterThanAir,
    Parachutist,
    Ultralight,
    UnmannedAerialVehicle,
    SpaceVehicle,
    Light,
    Small,
    Large,
    HighVortexLarge,
    Heavy,
    HighPerformance,
    Rotorcraft,
    NoInfo,
}

const CHAR_LOOKUP: &[u8; 64] =
    b"#ABCDEFGHIJKLMNOPQRSTUVWXYZ##### ###############0123456789######";

/// Maps a typecode and emitter category sub-field to an [`AircraftType`].
pub fn category(tc: u8, ec: u8) -> AircraftType {
    use AircraftType::*;
    match (tc, ec) {
        (1, _) => Unknown,
        (2, 0) => NoInfo,
        (2, 1) => SurfaceEmergencyVehicle,
        (2, 2) => SurfaceServiceVehicle,
        (2, 3) => Obstruction,
        (2, 4) => ClusterObstacle,
        (2, 5) => LineObstacle,
        (3, 0) => NoInfo,
        (3, 1) => Glider,
        (3, 2) => LighterThanAir,
        (3, 3) => Parachutist,
        (3, 4) => Ultralight,
        (3, 6) => UnmannedAerialVehicle,
        (3, 7) => SpaceVehicle,
        (4, 0) => NoInfo,
        (4, 1) => Light,
        (4, 2) => Small,
        (4, 3) => Large,
        (4, 4) => HighVortexLarge,
        (4, 5) => Heavy,
        (4, 6) => HighPerformance,
        (4, 7) => Rotorcraft,
        _ => Unknown,
    }
}

/// Decoded identification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub callsign: String,
    pub category: AircraftType,
}

/// Decodes an identification ME field. `me` starts at the typecode byte
/// (`me[0] >> 3` is TC, `me[0] & 0x07` is the emitter category), followed by
/// six bytes packing eight 6-bit characters.
///
/// Returns `None` only if the buffer is too short to contain the field;
/// characters outside the 6-bit char map decode to `'#'` and are left for the
/// caller to reject.
pub fn decode(me: &[u8]) -> Option<Identification> {
    if me.len() < 7 {
        return None;
    }
    let tc = me[0] >> 3;
    let ec = me[0] & 0x07;

    let mut packed: u64 = 0;
    for &b in &me[1..7] {
        packed = (packed << 8) | b as u64;
    }
    let mut callsign = String::with_capacity(8);
    for i in 0..8 {
        let shift = 48 - 6 * (i + 1);
        let idx = ((packed >> shift) & 0x3f) as usize;
        callsign.push(CHAR_LOOKUP[idx] as char);
    }

    Some(Identification {
        callsign,
        category: category(tc, ec),
    })
}
