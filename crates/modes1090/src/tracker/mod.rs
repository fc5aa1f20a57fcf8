//! Turns a stream of decoded Mode S messages into flight lifecycle and
//! track-point events, reported through a caller-supplied [`Sink`].

pub mod flight;
pub mod sink;
pub mod state;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::decode::cpr;
use crate::decode::identification::AircraftType;
use crate::decode::position::{CprFrame as PositionFrame, Position};
use crate::decode::velocity::Velocity;
use crate::decode::DecodedMessage;

pub use flight::{CprFrame, Flight, TrackPoint};
pub use sink::Sink;
pub use state::{State, StateError};

/// Tunables governing sweep cadence, staleness, and reportability hysteresis.
/// All time fields are in seconds of message time, not wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// When set, every reportable change is emitted immediately, ignoring
    /// `report_min_interval`.
    pub force_reporting: bool,
    pub sweep_interval: i64,
    pub decay_time: i64,
    pub report_min_interval: i64,
    pub heading_epsilon: f64,
    pub speed_epsilon: f64,
    pub vs_epsilon: i32,
    pub altitude_epsilon: i32,
    pub distance_epsilon_nm: f64,
    pub cpr_pair_window: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            force_reporting: false,
            sweep_interval: 30,
            decay_time: 5 * 60,
            report_min_interval: 5,
            heading_epsilon: 10.0,
            speed_epsilon: 10.0,
            vs_epsilon: 150,
            altitude_epsilon: 200,
            distance_epsilon_nm: 10.0,
            cpr_pair_window: 5,
        }
    }
}

/// Live per-aircraft bookkeeping over a stream of decoded Mode S messages.
///
/// Reserved address `000000` is never tracked: per DO-260, it marks a
/// non-transponder or anonymous source and carries no usable identity.
pub struct Tracker<S: Sink> {
    flights: HashMap<String, Flight>,
    next_sweep: i64,
    sink: S,
    config: Config,
}

impl<S: Sink> Tracker<S> {
    pub fn new(sink: S, config: Config) -> Self {
        Tracker {
            flights: HashMap::new(),
            next_sweep: 0,
            sink,
            config,
        }
    }

    /// Restores a tracker from a blob previously produced by [`Tracker::get_state`].
    /// Replays no `new_flight` calls for flights that already existed at save
    /// time. On a malformed blob, returns an error without touching `sink`.
    pub fn new_with_state(sink: S, config: Config, bytes: &[u8]) -> Result<Self, StateError> {
        let state = State::from_bytes(bytes)?;
        Ok(Tracker {
            flights: state.flights,
            next_sweep: state.next_sweep,
            sink,
            config,
        })
    }

    /// Serializes the flights map to an opaque blob for external persistence.
    pub fn get_state(&self) -> Vec<u8> {
        State::new(self.flights.clone(), self.next_sweep).to_bytes()
    }

    /// Feeds one decoded message for `icao_id` observed at `receive_time`
    /// (seconds, monotonic in message time) into the tracker.
    pub fn on_message(&mut self, icao_id: &str, receive_time: i64, decoded: Option<DecodedMessage>) {
        if icao_id.is_empty() || icao_id == "000000" {
            return;
        }

        self.sweep_if_needed(receive_time);

        if !self.flights.contains_key(icao_id) {
            self.sink.new_flight(icao_id, receive_time);
            self.flights.insert(icao_id.to_string(), Flight::new(icao_id.to_string(), receive_time));
        }

        let flight = self.flights.get_mut(icao_id).expect("just inserted");
        flight.last_seen = receive_time;
        flight.message_count += 1;
        flight.current.time = receive_time;

        match decoded {
            Some(DecodedMessage::Identification { callsign, category }) => {
                apply_identification(flight, &mut self.sink, callsign, category);
            }
            Some(DecodedMessage::Velocity(v)) => {
                let reportable = apply_velocity(flight, &self.config, &v);
                if reportable {
                    report(flight, &mut self.sink, &self.config, false);
                }
            }
            Some(DecodedMessage::Position(p)) => {
                let reportable = apply_position(flight, &self.config, receive_time, &p);
                if reportable {
                    report(flight, &mut self.sink, &self.config, false);
                }
            }
            None => {}
        }
    }

    fn sweep_if_needed(&mut self, now: i64) {
        if now < self.next_sweep {
            return;
        }
        self.next_sweep = now + self.config.sweep_interval;

        let stale: Vec<String> = self
            .flights
            .values()
            .filter(|f| now - f.last_seen > self.config.decay_time)
            .map(|f| f.icao_id.clone())
            .collect();

        for icao_id in stale {
            if let Some(flight) = self.flights.remove(&icao_id) {
                // Unlike close_all, a sweep eviction never flushes a pending
                // change: it only closes.
                self.sink.close_flight(&flight.icao_id, flight.last_seen, flight.message_count);
            }
        }
    }

    /// Flushes every live flight (final forced report, then close) and
    /// empties the tracker. Intended for clean shutdown.
    pub fn close_all(&mut self) {
        let mut icao_ids: Vec<String> = self.flights.keys().cloned().collect();
        icao_ids.sort();
        for icao_id in icao_ids {
            if let Some(mut flight) = self.flights.remove(&icao_id) {
                if flight.pending_change {
                    report(&mut flight, &mut self.sink, &self.config, true);
                }
                self.sink.close_flight(&flight.icao_id, flight.last_seen, flight.message_count);
            }
        }
    }
}

fn apply_identification(flight: &mut Flight, sink: &mut impl Sink, callsign: String, category: AircraftType) {
    if callsign.contains('#') {
        return;
    }

    let change = match (&flight.callsign, flight.category) {
        (None, _) => {
            flight.callsign = Some(callsign.clone());
            flight.category = Some(category);
            false
        }
        (Some(existing), Some(AircraftType::Unknown)) if *existing == callsign && category != AircraftType::Unknown => {
            flight.category = Some(category);
            false
        }
        (Some(existing), existing_category) => {
            if *existing == callsign && existing_category == Some(category) {
                return;
            }
            flight.callsign = Some(callsign.clone());
            flight.category = Some(category);
            true
        }
    };

    flight.current.callsign = Some(callsign.clone());
    flight.current.category = Some(category);
    flight.pending_change = true;
    sink.set_identity(&flight.icao_id, &callsign, category, change);
    flight.last = flight.current.clone();
    flight.pending_change = false;
    sink.add_track_point(&flight.icao_id, &flight.current);
}

/// Smallest angular difference between two [0,360) headings, normalized to
/// [-180,180] before comparison against the epsilon.
fn heading_delta(a: f64, b: f64) -> f64 {
    let mut d = (a - b) % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d < -180.0 {
        d += 360.0;
    }
    d.abs()
}

/// Returns true if heading/speed/vertical-rate changed by at least its
/// epsilon, or was previously unobserved (first valid value is always
/// reportable). Any nonzero change marks the flight dirty regardless.
fn apply_velocity(flight: &mut Flight, config: &Config, v: &Velocity) -> bool {
    let mut reportable = false;

    if let Some(heading) = v.heading {
        if flight.current.heading != Some(heading) {
            flight.pending_change = true;
        }
        reportable |= match flight.last.heading {
            None => true,
            Some(prev) => heading_delta(prev, heading) >= config.heading_epsilon,
        };
        flight.current.heading = Some(heading);
    }

    if let Some(speed) = v.speed {
        if flight.current.speed != Some(speed) {
            flight.pending_change = true;
        }
        reportable |= match flight.last.speed {
            None => true,
            Some(prev) => (prev - speed).abs() >= config.speed_epsilon,
        };
        flight.current.speed = Some(speed);
        flight.current.speed_type = Some(v.speed_type);
    }

    if let Some(mut vr) = v.vertical_rate {
        if vr.abs() <= 64 {
            vr = 0;
        }
        if flight.current.vertical_rate != Some(vr) {
            flight.pending_change = true;
        }
        reportable |= match flight.last.vertical_rate {
            None => true,
            Some(prev) => (prev - vr).abs() >= config.vs_epsilon,
        };
        flight.current.vertical_rate = Some(vr);
    }

    reportable
}

/// Updates altitude unconditionally, and attempts CPR pairing; reports when
/// altitude or resolved position crosses its epsilon from the last emission.
fn apply_position(flight: &mut Flight, config: &Config, receive_time: i64, p: &Position) -> bool {
    let mut reportable = false;

    if let Some(alt) = p.altitude_ft {
        if flight.current.altitude != Some(alt) {
            flight.pending_change = true;
        }
        reportable |= match flight.last.altitude {
            None => true,
            Some(prev) => (prev - alt).abs() >= config.altitude_epsilon,
        };
        flight.current.altitude = Some(alt);
    }

    let frame = CprFrame {
        position: *p,
        timestamp: receive_time,
    };
    match p.cpr_frame {
        PositionFrame::Even => flight.even_frame = Some(frame),
        PositionFrame::Odd => flight.odd_frame = Some(frame),
    }

    if let (Some(even), Some(odd)) = (flight.even_frame, flight.odd_frame) {
        if (even.timestamp - odd.timestamp).abs() <= config.cpr_pair_window {
            let newer_is_odd = odd.timestamp >= even.timestamp;
            if let Some(pos) = cpr::resolve(
                even.position.lat_cpr,
                even.position.lon_cpr,
                odd.position.lat_cpr,
                odd.position.lon_cpr,
                newer_is_odd,
            ) {
                if flight.current.latitude != Some(pos.latitude) || flight.current.longitude != Some(pos.longitude) {
                    flight.pending_change = true;
                }
                reportable |= match (flight.last.latitude, flight.last.longitude) {
                    (Some(lat), Some(lon)) => {
                        cpr::distance_nm(lat, lon, pos.latitude, pos.longitude) >= config.distance_epsilon_nm
                    }
                    _ => true,
                };
                flight.current.latitude = Some(pos.latitude);
                flight.current.longitude = Some(pos.longitude);
            }
        } else {
            // Stale counterpart: keep only the frame that just arrived.
            match p.cpr_frame {
                PositionFrame::Even => flight.odd_frame = None,
                PositionFrame::Odd => flight.even_frame = None,
            }
        }
    }

    reportable
}

/// Emits a track point unless rate-limited. `force` (a sweep/close-time
/// flush) and `config.force_reporting` both bypass `report_min_interval`.
fn report(flight: &mut Flight, sink: &mut impl Sink, config: &Config, force: bool) {
    if !force && !config.force_reporting && flight.last.time + config.report_min_interval > flight.current.time {
        return;
    }
    flight.last = flight.current.clone();
    flight.pending_change = false;
    sink.add_track_point(&flight.icao_id, &flight.current);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::identification::AircraftType;
    use crate::decode::position::CprFrame as PosFrame;
    use crate::decode::velocity::SpeedType;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, PartialEq, Clone)]
    enum Event {
        NewFlight(String, i64),
        CloseFlight(String, i64, u64),
        SetIdentity(String, String, AircraftType, bool),
        AddTrackPoint(String, TrackPoint),
    }

    #[derive(Clone)]
    struct RecordingSink(Rc<RefCell<Vec<Event>>>);

    impl Sink for RecordingSink {
        fn new_flight(&mut self, icao_id: &str, first_seen: i64) {
            self.0.borrow_mut().push(Event::NewFlight(icao_id.to_string(), first_seen));
        }
        fn close_flight(&mut self, icao_id: &str, last_seen: i64, message_count: u64) {
            self.0
                .borrow_mut()
                .push(Event::CloseFlight(icao_id.to_string(), last_seen, message_count));
        }
        fn set_identity(&mut self, icao_id: &str, callsign: &str, category: AircraftType, change: bool) {
            self.0.borrow_mut().push(Event::SetIdentity(
                icao_id.to_string(),
                callsign.to_string(),
                category,
                change,
            ));
        }
        fn add_track_point(&mut self, icao_id: &str, track_point: &TrackPoint) {
            self.0
                .borrow_mut()
                .push(Event::AddTrackPoint(icao_id.to_string(), track_point.clone()));
        }
    }

    fn make_tracker() -> (Tracker<RecordingSink>, Rc<RefCell<Vec<Event>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let tracker = Tracker::new(RecordingSink(events.clone()), Config::default());
        (tracker, events)
    }

    #[test]
    fn first_message_creates_a_flight() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message("4840d6", 1000, None);
        assert_eq!(events.borrow()[0], Event::NewFlight("4840d6".to_string(), 1000));
        assert_eq!(tracker.flights.len(), 1);
    }

    #[test]
    fn reserved_address_is_never_tracked() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message("000000", 1000, None);
        assert!(events.borrow().is_empty());
        assert!(tracker.flights.is_empty());
    }

    #[test]
    fn first_callsign_is_not_a_change() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message(
            "4840d6",
            1000,
            Some(DecodedMessage::Identification {
                callsign: "KLM1023 ".to_string(),
                category: AircraftType::Heavy,
            }),
        );
        let evs = events.borrow();
        match &evs[1] {
            Event::SetIdentity(icao, callsign, category, change) => {
                assert_eq!(icao, "4840d6");
                assert_eq!(callsign, "KLM1023 ");
                assert_eq!(*category, AircraftType::Heavy);
                assert!(!change);
            }
            other => panic!("expected SetIdentity, got {other:?}"),
        }
    }

    #[test]
    fn differing_callsign_is_reported_as_a_change() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message(
            "4840d6",
            1000,
            Some(DecodedMessage::Identification {
                callsign: "KLM1023 ".to_string(),
                category: AircraftType::Heavy,
            }),
        );
        tracker.on_message(
            "4840d6",
            1001,
            Some(DecodedMessage::Identification {
                callsign: "KLM1024 ".to_string(),
                category: AircraftType::Heavy,
            }),
        );
        let evs = events.borrow();
        let last_identity = evs
            .iter()
            .rev()
            .find_map(|e| match e {
                Event::SetIdentity(_, callsign, _, change) => Some((callsign.clone(), *change)),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_identity, ("KLM1024 ".to_string(), true));
    }

    #[test]
    fn callsign_with_hash_is_rejected() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message(
            "4840d6",
            1000,
            Some(DecodedMessage::Identification {
                callsign: "KLM102# ".to_string(),
                category: AircraftType::Heavy,
            }),
        );
        assert_eq!(events.borrow().len(), 1); // only NewFlight
    }

    #[test]
    fn small_speed_delta_is_suppressed_until_it_accumulates() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message(
            "4840d6",
            1000,
            Some(DecodedMessage::Velocity(Velocity {
                speed_type: SpeedType::Gs,
                speed: Some(200.0),
                heading: Some(90.0),
                vertical_rate: None,
                intent_change: false,
            })),
        );
        let after_first = events.borrow().len();

        tracker.on_message(
            "4840d6",
            1006,
            Some(DecodedMessage::Velocity(Velocity {
                speed_type: SpeedType::Gs,
                speed: Some(205.0),
                heading: Some(90.0),
                vertical_rate: None,
                intent_change: false,
            })),
        );
        assert_eq!(events.borrow().len(), after_first, "sub-epsilon delta should not emit");

        tracker.on_message(
            "4840d6",
            1012,
            Some(DecodedMessage::Velocity(Velocity {
                speed_type: SpeedType::Gs,
                speed: Some(215.0),
                heading: Some(90.0),
                vertical_rate: None,
                intent_change: false,
            })),
        );
        assert!(events.borrow().len() > after_first, "delta past epsilon should emit");
    }

    #[test]
    fn min_interval_rate_limits_even_large_deltas() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message(
            "4840d6",
            1000,
            Some(DecodedMessage::Velocity(Velocity {
                speed_type: SpeedType::Gs,
                speed: Some(200.0),
                heading: None,
                vertical_rate: None,
                intent_change: false,
            })),
        );
        let after_first = events.borrow().len();

        tracker.on_message(
            "4840d6",
            1001,
            Some(DecodedMessage::Velocity(Velocity {
                speed_type: SpeedType::Gs,
                speed: Some(400.0),
                heading: None,
                vertical_rate: None,
                intent_change: false,
            })),
        );
        assert_eq!(events.borrow().len(), after_first, "within min interval, should not emit yet");
    }

    #[test]
    fn cpr_pair_outside_window_does_not_resolve_position() {
        let (mut tracker, _events) = make_tracker();
        tracker.on_message(
            "406621",
            1000,
            Some(DecodedMessage::Position(Position {
                altitude_ft: Some(38000),
                cpr_frame: PosFrame::Even,
                lat_cpr: 93000,
                lon_cpr: 51372,
                ss: 0,
            })),
        );
        tracker.on_message(
            "406621",
            1010,
            Some(DecodedMessage::Position(Position {
                altitude_ft: Some(38000),
                cpr_frame: PosFrame::Odd,
                lat_cpr: 74158,
                lon_cpr: 50194,
                ss: 0,
            })),
        );
        let flight = &tracker.flights["406621"];
        assert!(flight.current.latitude.is_none());
    }

    #[test]
    fn cpr_pair_within_window_resolves_position() {
        let (mut tracker, _events) = make_tracker();
        // Odd frame arrives first, even frame second: the even frame is the
        // newer one, so the resolved position is read off its latitude.
        tracker.on_message(
            "406621",
            1000,
            Some(DecodedMessage::Position(Position {
                altitude_ft: Some(38000),
                cpr_frame: PosFrame::Odd,
                lat_cpr: 74158,
                lon_cpr: 50194,
                ss: 0,
            })),
        );
        tracker.on_message(
            "406621",
            1002,
            Some(DecodedMessage::Position(Position {
                altitude_ft: Some(38000),
                cpr_frame: PosFrame::Even,
                lat_cpr: 93000,
                lon_cpr: 51372,
                ss: 0,
            })),
        );
        let flight = &tracker.flights["406621"];
        let lat = flight.current.latitude.expect("should have resolved a position");
        assert!((52.25..=52.26).contains(&lat));
    }

    #[test]
    fn close_all_flushes_pending_change_then_closes() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message(
            "4840d6",
            1000,
            Some(DecodedMessage::Velocity(Velocity {
                speed_type: SpeedType::Gs,
                speed: Some(200.0),
                heading: None,
                vertical_rate: None,
                intent_change: false,
            })),
        );
        events.borrow_mut().clear();

        tracker.on_message(
            "4840d6",
            1001,
            Some(DecodedMessage::Velocity(Velocity {
                speed_type: SpeedType::Gs,
                speed: Some(202.0),
                heading: None,
                vertical_rate: None,
                intent_change: false,
            })),
        );
        // Sub-epsilon and within min interval: stays pending, not yet emitted.
        assert!(events.borrow().is_empty());

        tracker.close_all();
        let evs = events.borrow();
        assert!(matches!(evs[0], Event::AddTrackPoint(..)));
        assert!(matches!(evs[1], Event::CloseFlight(..)));
        assert!(tracker.flights.is_empty());
    }

    #[test]
    fn sweep_evicts_stale_flights_using_message_time() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message("4840d6", 0, None);
        // Past decay_time (300s) and past the next sweep boundary (30s).
        tracker.on_message("a1b2c3", 400, None);

        let evs = events.borrow();
        assert!(evs
            .iter()
            .any(|e| matches!(e, Event::CloseFlight(icao, ..) if icao == "4840d6")));
        assert!(tracker.flights.contains_key("a1b2c3"));
        assert!(!tracker.flights.contains_key("4840d6"));
    }

    #[test]
    fn sweep_closes_without_flushing_a_pending_change() {
        let (mut tracker, events) = make_tracker();
        tracker.on_message(
            "4840d6",
            0,
            Some(DecodedMessage::Velocity(Velocity {
                speed_type: SpeedType::Gs,
                speed: Some(200.0),
                heading: None,
                vertical_rate: None,
                intent_change: false,
            })),
        );
        events.borrow_mut().clear();
        // Sub-epsilon, within min interval: leaves pending_change set but
        // nothing emitted.
        tracker.on_message(
            "4840d6",
            1,
            Some(DecodedMessage::Velocity(Velocity {
                speed_type: SpeedType::Gs,
                speed: Some(202.0),
                heading: None,
                vertical_rate: None,
                intent_change: false,
            })),
        );
        assert!(events.borrow().is_empty());
        assert!(tracker.flights["4840d6"].pending_change);

        // Past decay_time and the next sweep boundary; unlike close_all, a
        // sweep must never flush the pending change into a track point.
        tracker.on_message("a1b2c3", 400, None);

        let evs = events.borrow();
        assert!(!evs.iter().any(|e| matches!(e, Event::AddTrackPoint(icao, ..) if icao == "4840d6")));
        assert!(evs
            .iter()
            .any(|e| matches!(e, Event::CloseFlight(icao, ..) if icao == "4840d6")));
    }

    #[test]
    fn state_round_trips_through_serde_json() {
        let (mut tracker, _events) = make_tracker();
        tracker.on_message(
            "4840d6",
            1000,
            Some(DecodedMessage::Identification {
                callsign: "KLM1023 ".to_string(),
                category: AircraftType::Heavy,
            }),
        );
        let blob = tracker.get_state();

        let (_, events2) = make_tracker();
        let restored_tracker =
            Tracker::new_with_state(RecordingSink(events2), Config::default(), &blob).unwrap();
        assert_eq!(restored_tracker.flights["4840d6"].callsign, Some("KLM1023 ".to_string()));
    }

    #[test]
    fn malformed_state_blob_is_rejected() {
        let (_, events) = make_tracker();
        let result = Tracker::new_with_state(RecordingSink(events), Config::default(), b"garbage");
        assert!(result.is_err());
    }
}
