//! Airborne position (TC 9-18): barometric altitude plus a raw CPR frame.

use serde::{Deserialize, Serialize};

use crate::gillham;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CprFrame {
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub altitude_ft: Option<i32>,
    pub cpr_frame: CprFrame,
    pub lat_cpr: u32,
    pub lon_cpr: u32,
    pub ss: u8,
}

/// Decodes the 12-bit altitude field shared by the Q=1 (direct) and Q=0
/// (Gillham) encodings. `me[1]` and `me[2]` hold the field.
fn decode_altitude(me: &[u8]) -> Option<i32> {
    let q = me[1] & 0x01;
    if q == 1 {
        let n = (((me[1] & 0xFE) as u32) << 3) | ((me[2] & 0xF0) as u32 >> 4);
        let n = n * 25;
        if n > 1000 {
            Some(n as i32 - 1000)
        } else {
            None
        }
    } else {
        // Remap the 12-bit field into the 13-bit Mode-A-style layout the
        // Gillham decoder expects (an M/X bit is inserted at bit 6).
        let num: u16 = ((me[1] as u16) << 4) | ((me[2] as u16 & 0xF0) >> 4);
        let id13 = ((num & 0x0fc0) << 1) | (num & 0x003f);
        let gray = gillham::decode_id13(id13);
        gillham::gray_to_altitude(gray).ok().map(|steps| steps * 100)
    }
}

/// Decodes an airborne position ME field. `me[0]` holds TC(5)+SS(2)+1 spare
/// bit, `me[1..3]` the altitude, `me[2]` bit 2 the CPR frame parity, and
/// `me[2..7]` the 17+17-bit CPR latitude/longitude.
pub fn decode(me: &[u8]) -> Option<Position> {
    if me.len() < 7 {
        return None;
    }
    let ss = (me[0] >> 1) & 0x03;
    let altitude_ft = decode_altitude(me);
    let cpr_frame = if me[2] & 0x04 != 0 {
        CprFrame::Odd
    } else {
        CprFrame::Even
    };

    // lat_cpr/lon_cpr: 17 bits each. The top 2 bits of lat_cpr are the low 2
    // bits of me[2] (after the altitude nibble and frame-parity bit); the
    // remaining 32 bits (15 bits of lat_cpr + all 17 of lon_cpr) follow in
    // me[3..7].
    let top2 = (me[2] & 0x03) as u64;
    let mut low32: u64 = 0;
    for &b in &me[3..7] {
        low32 = (low32 << 8) | b as u64;
    }
    let combined: u64 = (top2 << 32) | low32;
    let lat_cpr = ((combined >> 17) & 0x1FFFF) as u32;
    let lon_cpr = (combined & 0x1FFFF) as u32;

    Some(Position {
        altitude_ft,
        cpr_frame,
        lat_cpr,
        lon_cpr,
        ss,
    })
}
