//! Mode S / ADS-B payload decoding: CRC verification, downlink-format
//! dispatch, and per-typecode message bodies.

pub mod cpr;
pub mod identification;
pub mod position;
pub mod velocity;

use serde::{Deserialize, Serialize};

use crate::crc::crc24;
use identification::{AircraftType, Identification};
use position::Position;
use velocity::Velocity;

/// A fully decoded Mode S/ADS-B message body. `None` at the call site means
/// the message was structurally valid (ICAO recovered, CRC check if
/// applicable) but carries a typecode this crate does not decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecodedMessage {
    Identification { callsign: String, category: AircraftType },
    Velocity(Velocity),
    Position(Position),
}

fn icao_hex(bytes: &[u8]) -> String {
    format!("{:02x}{:02x}{:02x}", bytes[0], bytes[1], bytes[2])
}

/// Decodes one Mode S payload (the bytes following the 6-byte MLAT timestamp
/// and signal level in a [`crate::raw::RawMessage`]), returning the ICAO
/// address as a lowercase hex string and, if decodable, the message body.
///
/// Per [§4.2], frame-local failures (unknown DF, failed CRC) are not errors:
/// they surface as `("", None)` or `(icao, None)` so the caller can still
/// update flight last-seen/message-count bookkeeping.
pub fn decode(body: &[u8]) -> (String, Option<DecodedMessage>) {
    if body.is_empty() {
        return (String::new(), None);
    }
    let df = body[0] >> 3;

    match df {
        17 | 18 => decode_extended_squitter(body),
        20 | 21 => decode_comm_b(body),
        _ => (String::new(), None),
    }
}

fn decode_extended_squitter(body: &[u8]) -> (String, Option<DecodedMessage>) {
    if body.len() < 14 {
        return (String::new(), None);
    }
    let icao = icao_hex(&body[1..4]);

    if crc24(body) != 0 {
        return (icao, None);
    }

    let me = &body[4..11];
    let tc = me[0] >> 3;
    let decoded = match tc {
        1..=4 => identification::decode(me).map(|Identification { callsign, category }| {
            DecodedMessage::Identification { callsign, category }
        }),
        9..=18 => position::decode(me).map(DecodedMessage::Position),
        19 => velocity::decode(me).map(DecodedMessage::Velocity),
        _ => None,
    };

    (icao, decoded)
}

/// DF20/21 (Comm-B altitude/identity reply). The ICAO address is not
/// transmitted in the clear; the address/parity overlay means the CRC
/// residue over the whole message equals the ICAO address directly.
fn decode_comm_b(body: &[u8]) -> (String, Option<DecodedMessage>) {
    if body.len() < 14 {
        return (String::new(), None);
    }
    let residue = crc24(body);
    let icao = icao_hex(&[
        ((residue >> 16) & 0xff) as u8,
        ((residue >> 8) & 0xff) as u8,
        (residue & 0xff) as u8,
    ]);

    if body[4] != 0x20 {
        return (icao, None);
    }
    let me = &body[4..11];
    let decoded = identification::decode(me).map(|Identification { callsign, category }| {
        DecodedMessage::Identification { callsign, category }
    });
    (icao, decoded)
}
