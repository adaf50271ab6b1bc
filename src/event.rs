//! Stream event model and line parsing.
//!
//! The event stream is line based. Two line shapes are accepted, selected by
//! the field before the first comma:
//!
//! - `SE,<sid>,<ts>,<x>,<y>,<z>,...` — a sensor position report, parsed into
//!   a [`PositionEvent`]. Fields past `z` (velocity and acceleration in the
//!   raw dataset) are ignored.
//! - `GI,<event_id>,<_>,<_>,<ts>,...` — a game-interruption marker, parsed
//!   into an [`InterruptionEvent`] or a [`ResumeEvent`] depending on the
//!   event id.
//!
//! Two parsing strategies are provided: [`parse_event_line`] splits on
//! commas and is the fast path used by the pipeline, while
//! [`parse_event_line_regex`] matches the dataset grammar with regular
//! expressions and serves as a conformance oracle in the test suite. Both
//! produce identical results on well-formed lines.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::constants::*;
use crate::error::*;

/// Phase of the match a timestamp falls into. The in-play interval is closed
/// on both ends of each half, so events exactly at [`BREAK_START`] or
/// [`BREAK_END`] are in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    PreMatch,
    InPlay,
    Break,
    PostMatch,
}

impl GamePhase {
    pub fn of(timestamp: u64) -> Self {
        if timestamp < GAME_START {
            GamePhase::PreMatch
        } else if timestamp <= BREAK_START {
            GamePhase::InPlay
        } else if timestamp < BREAK_END {
            GamePhase::Break
        } else if timestamp <= GAME_END {
            GamePhase::InPlay
        } else {
            GamePhase::PostMatch
        }
    }
}

/// A sensor position report: sensor id, picosecond timestamp and the sensed
/// coordinates in field units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionEvent {
    pub sid: u32,
    pub timestamp: u64,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl PositionEvent {
    pub fn new(sid: u32, timestamp: u64, x: i32, y: i32, z: i32) -> Self {
        Self {
            sid,
            timestamp,
            x,
            y,
            z,
        }
    }

    pub fn coordinates(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }

    pub fn phase(&self) -> GamePhase {
        GamePhase::of(self.timestamp)
    }

    pub fn is_in_play(&self) -> bool {
        self.phase() == GamePhase::InPlay
    }
}

impl fmt::Display for PositionEvent {
    /// Canonical dataset rendering of the event, parseable by both parsing
    /// strategies.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SE,{},{},{},{},{}",
            self.sid, self.timestamp, self.x, self.y, self.z
        )
    }
}

/// A referee whistle suspending play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterruptionEvent {
    pub timestamp: u64,
}

/// A referee whistle resuming play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResumeEvent {
    pub timestamp: u64,
}

/// A parsed stream line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Event {
    Position(PositionEvent),
    Interruption(InterruptionEvent),
    Resume(ResumeEvent),
}

fn interruption_event(event_id: u32, timestamp: u64) -> MonitorResult<Event> {
    match event_id {
        FIRST_HALF_INTERRUPTION_ID | SECOND_HALF_INTERRUPTION_ID => {
            Ok(Event::Interruption(InterruptionEvent { timestamp }))
        }
        FIRST_HALF_RESUME_ID | SECOND_HALF_RESUME_ID => {
            Ok(Event::Resume(ResumeEvent { timestamp }))
        }
        other => MonitorError::new_result(MonitorErrorVariant::UnknownInterruptionId(other)),
    }
}

fn unknown_line<T>(line: &str) -> MonitorResult<T> {
    MonitorError::new_result(MonitorErrorVariant::UnknownLine(line.to_string()))
}

/// Parses one stream line by splitting on commas. This is the default
/// strategy of the pipeline; the stream is large and splitting is materially
/// faster than regex matching.
pub fn parse_event_line(line: &str) -> MonitorResult<Event> {
    let mut fields = line.split(',');
    match fields.next() {
        Some("SE") => {
            let sid = fields.next().and_then(|f| f.parse::<u32>().ok());
            let ts = fields.next().and_then(|f| f.parse::<u64>().ok());
            let x = fields.next().and_then(|f| f.parse::<i32>().ok());
            let y = fields.next().and_then(|f| f.parse::<i32>().ok());
            let z = fields.next().and_then(|f| f.parse::<i32>().ok());
            match (sid, ts, x, y, z) {
                (Some(sid), Some(ts), Some(x), Some(y), Some(z)) => {
                    Ok(Event::Position(PositionEvent::new(sid, ts, x, y, z)))
                }
                _ => unknown_line(line),
            }
        }
        Some("GI") => {
            let event_id: u32 = match fields.next().and_then(|f| f.parse().ok()) {
                Some(id) => id,
                None => return unknown_line(line),
            };
            // Two descriptive fields sit between the event id and the
            // timestamp.
            let ts: u64 = match fields.nth(2).and_then(|f| f.parse().ok()) {
                Some(ts) => ts,
                None => return unknown_line(line),
            };
            interruption_event(event_id, ts)
        }
        _ => unknown_line(line),
    }
}

static SE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^SE,(\d+),(\d+),(-?\d+),(-?\d+),(-?\d+)(?:,.*)?$").unwrap()
});
static GI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^GI,(\d+),([ \w]*),(0|\d{2}:\d{2}:\d{2}\.\d{3}),(\d+)(?:,.*)?$").unwrap()
});

/// Parses one stream line against the dataset grammar. Conformance oracle
/// for [`parse_event_line`]; both strategies must agree on every well-formed
/// line.
pub fn parse_event_line_regex(line: &str) -> MonitorResult<Event> {
    if let Some(caps) = GI_RE.captures(line) {
        let event_id = caps[1].parse().map_err(|_| {
            MonitorError::new(MonitorErrorVariant::UnknownLine(line.to_string()))
        })?;
        let ts = caps[4].parse().map_err(|_| {
            MonitorError::new(MonitorErrorVariant::UnknownLine(line.to_string()))
        })?;
        interruption_event(event_id, ts)
    } else if let Some(caps) = SE_RE.captures(line) {
        let sid = caps[1].parse::<u32>().ok();
        let ts = caps[2].parse::<u64>().ok();
        let x = caps[3].parse::<i32>().ok();
        let y = caps[4].parse::<i32>().ok();
        let z = caps[5].parse::<i32>().ok();
        match (sid, ts, x, y, z) {
            (Some(sid), Some(ts), Some(x), Some(y), Some(z)) => {
                Ok(Event::Position(PositionEvent::new(sid, ts, x, y, z)))
            }
            _ => unknown_line(line),
        }
    } else {
        unknown_line(line)
    }
}
