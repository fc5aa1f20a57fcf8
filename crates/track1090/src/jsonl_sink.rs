//! Writes one JSON object per lifecycle/track-point event. Owns only the
//! writer; all flight bookkeeping lives in the tracker.

use std::io::Write;

use modes1090::prelude::*;
use serde::Serialize;
use serde_json::json;

pub struct JsonlSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        JsonlSink { writer }
    }

    fn write_line(&mut self, value: serde_json::Value) {
        if let Err(e) = writeln!(self.writer, "{value}") {
            tracing::warn!(error = %e, "failed to write track log line");
        }
    }
}

#[derive(Serialize)]
struct TrackPointView<'a> {
    icao_id: &'a str,
    #[serde(flatten)]
    point: &'a TrackPoint,
}

impl<W: Write> Sink for JsonlSink<W> {
    fn new_flight(&mut self, icao_id: &str, first_seen: i64) {
        self.write_line(json!({
            "event": "new_flight",
            "icao_id": icao_id,
            "first_seen": first_seen,
        }));
    }

    fn close_flight(&mut self, icao_id: &str, last_seen: i64, message_count: u64) {
        self.write_line(json!({
            "event": "close_flight",
            "icao_id": icao_id,
            "last_seen": last_seen,
            "message_count": message_count,
        }));
    }

    fn set_identity(&mut self, icao_id: &str, callsign: &str, category: modes1090::decode::identification::AircraftType, change: bool) {
        self.write_line(json!({
            "event": "set_identity",
            "icao_id": icao_id,
            "callsign": callsign,
            "category": category,
            "change": change,
        }));
    }

    fn add_track_point(&mut self, icao_id: &str, track_point: &TrackPoint) {
        let view = TrackPointView { icao_id, point: track_point };
        self.write_line(json!({
            "event": "track_point",
            "data": view,
        }));
    }
}
