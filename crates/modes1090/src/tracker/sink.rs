//! The tracker's only way of talking to the outside world.

use crate::decode::identification::AircraftType;
use crate::tracker::flight::TrackPoint;

/// Synchronous, infallible callbacks describing a flight's lifecycle.
///
/// Calls for a given ICAO address always arrive in this order: exactly one
/// [`Sink::new_flight`], any number of [`Sink::set_identity`] and
/// [`Sink::add_track_point`] calls interleaved, then exactly one
/// [`Sink::close_flight`]. Sinks own their own durability, batching, and
/// flushing; the tracker core never retries or buffers on their behalf.
pub trait Sink {
    fn new_flight(&mut self, icao_id: &str, first_seen: i64);
    fn close_flight(&mut self, icao_id: &str, last_seen: i64, message_count: u64);
    fn set_identity(&mut self, icao_id: &str, callsign: &str, category: AircraftType, change: bool);
    fn add_track_point(&mut self, icao_id: &str, track_point: &TrackPoint);
}
