#![doc = include_str!("../readme.md")]

pub mod beast;
pub mod crc;
pub mod decode;
pub mod gillham;
pub mod raw;
pub mod tracker;

pub mod prelude {
    pub use crate::beast::{BeastReader, FramingError};
    pub use crate::decode::{decode, DecodedMessage};
    pub use crate::raw::{RawKind, RawMessage};
    pub use crate::tracker::{Config, Flight, Sink, State, StateError, Tracker, TrackPoint};
}
