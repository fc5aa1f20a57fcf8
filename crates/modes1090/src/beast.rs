//! De-framer for the Mode-S Beast binary wire format.
//!
//! Frames start with `0x1A` followed by a one-byte type tag (`'1'`, `'2'` or
//! `'3'`) and a fixed-size payload of 6 bytes of MLAT timestamp, 1 byte of
//! signal level, and a body whose length depends on the type. `0x1A` bytes
//! occurring inside the payload are escaped by doubling.

use std::fmt;
use std::io::Read;

use crate::raw::{RawKind, RawMessage};

const ESCAPE: u8 = 0x1A;

/// Errors the de-framer can surface to its caller.
#[derive(Debug)]
pub enum FramingError {
    /// The underlying reader reached end of stream or a fatal I/O error.
    /// Terminal: the driving loop should stop.
    Io(std::io::Error),
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingError::Io(e) => write!(f, "beast stream error: {e}"),
        }
    }
}

impl std::error::Error for FramingError {}

impl From<std::io::Error> for FramingError {
    fn from(e: std::io::Error) -> Self {
        FramingError::Io(e)
    }
}

/// Reads one payload byte, un-escaping a doubled `0x1A`.
fn read_byte<R: Read>(r: &mut R) -> Result<u8, FramingError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    if buf[0] == ESCAPE {
        // A real escape byte inside the payload is always doubled; consume
        // the stuffed partner without emitting it.
        r.read_exact(&mut buf)?;
    }
    Ok(buf[0])
}

fn read_bytes<R: Read>(r: &mut R, n: usize) -> Result<Vec<u8>, FramingError> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(read_byte(r)?);
    }
    Ok(out)
}

/// Pull-style de-framer over a byte stream. One instance per connection.
pub struct BeastReader<R> {
    inner: R,
}

impl<R: Read> BeastReader<R> {
    pub fn new(inner: R) -> Self {
        BeastReader { inner }
    }

    /// Reads the next frame. Returns `Ok(None)` when the type tag byte is not
    /// recognized; this is a recoverable, frame-local condition — the reader
    /// has already resynchronized to the next `0x1A` and the caller should
    /// simply call `next_frame` again.
    pub fn next_frame(&mut self) -> Result<Option<RawMessage>, FramingError> {
        // Skip forward to the next escape byte. A raw 0x1A here is never
        // itself escaped: it is always the start of a frame.
        let mut b = [0u8; 1];
        loop {
            self.inner.read_exact(&mut b)?;
            if b[0] == ESCAPE {
                break;
            }
        }

        self.inner.read_exact(&mut b)?;
        let (kind, payload_len) = match b[0] {
            0x31 => (RawKind::ModeAC, 9),
            0x32 => (RawKind::ModeSShort, 14),
            0x33 => (RawKind::ModeSLong, 21),
            other => {
                tracing::debug!(tag = other, "unknown beast message type, resyncing");
                return Ok(None);
            }
        };

        let data = read_bytes(&mut self.inner, payload_len)?;
        let mut timestamp = [0u8; 6];
        timestamp.copy_from_slice(&data[0..6]);
        let signal = data[6];
        let body = data[7..].to_vec();

        Ok(Some(RawMessage::new(kind, timestamp, signal, body)))
    }
}
