//! Airborne velocity (TC 19): ground speed or air speed, heading, vertical rate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedType {
    Gs,
    Ias,
    Tas,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub speed_type: SpeedType,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub vertical_rate: Option<i32>,
    pub intent_change: bool,
}

/// Decodes an airborne velocity ME field. `me[0]` holds TC(5)+ST(3); the
/// remaining six bytes are subtype-specific.
pub fn decode(me: &[u8]) -> Option<Velocity> {
    if me.len() < 7 {
        return None;
    }
    let st = me[0] & 0x07;
    let intent_change = me[1] & 0x80 != 0;

    let (speed_type, speed, heading) = match st {
        1 => {
            let s_ew = (me[1] & 0x04) != 0;
            let v_ew = (((me[1] as u16 & 0x03) << 8) | me[2] as u16) as f64;
            let s_ns = (me[3] & 0x80) != 0;
            let v_ns = (((me[3] as u16 & 0x7f) << 3) | (me[4] as u16 >> 5)) as f64;

            // A raw magnitude of 0 means "not available" on that axis, not a
            // one-knot velocity; without both axes there is no speed/heading.
            if v_ew == 0.0 && v_ns == 0.0 {
                (SpeedType::Gs, None, None)
            } else {
                let vwe = if s_ew { -(v_ew - 1.0) } else { v_ew - 1.0 };
                let vsn = if s_ns { -(v_ns - 1.0) } else { v_ns - 1.0 };

                let v = (vwe * vwe + vsn * vsn).sqrt();
                let mut h = vwe.atan2(vsn).to_degrees();
                if h < 0.0 {
                    h += 360.0;
                }
                (SpeedType::Gs, Some(v.round()), Some(h.round()))
            }
        }
        3 => {
            let status_heading = (me[1] & 0x04) != 0;
            let raw_heading = (((me[1] as u16 & 0x03) << 8) | me[2] as u16) as f64;
            let heading = if status_heading {
                Some((raw_heading / 1024.0 * 360.0).round())
            } else {
                None
            };
            let speed_type = if me[3] & 0x80 != 0 {
                SpeedType::Tas
            } else {
                SpeedType::Ias
            };
            let raw_speed = (((me[3] as u16 & 0x7f) << 3) | (me[4] as u16 >> 5)) as u16;
            let speed = if raw_speed == 0 {
                None
            } else {
                Some(raw_speed as f64)
            };
            (speed_type, speed, heading)
        }
        _ => return None,
    };

    let s_vr = (me[4] & 0x08) != 0;
    let raw_vr = (((me[4] as i32 & 0x07) << 6) | (me[5] as i32 >> 2)) as i32;
    let vertical_rate = if raw_vr == 0 {
        None
    } else {
        let vr = (raw_vr - 1) * 64;
        Some(if s_vr { -vr } else { vr })
    };

    Some(Velocity {
        speed_type,
        speed,
        heading,
        vertical_rate,
        intent_change,
    })
}
