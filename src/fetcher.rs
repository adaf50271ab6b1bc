//! Stream driver: turns the raw line stream into a lazy, finite, single-pass
//! sequence of [`Batch`] values.
//!
//! The fetcher owns the [`Context`] and mutates it as events pass through,
//! *regardless of game phase* — positions keep tracking through pre-match
//! warm-up, referee interruptions and the half-time break, so the field
//! state is correct the moment play resumes. Only in-play events while the
//! game is running ever enter a batch.
//!
//! Each emitted [`Batch`] carries a [`Snapshot`] of the field taken
//! immediately before its first event was applied, so batch consumers can
//! replay the batch against a consistent starting state without ever
//! touching the live context.
//!
//! A batch ends for one of four reasons: it is full; a statistics period
//! (`time_units` seconds of game time) elapsed; play was interrupted or
//! reached the half-time break; or the stream ended. The event that triggers
//! a period boundary logically belongs to the *next* period: it is parked in
//! a carry bucket and delivered at the front of the following batch, so its
//! contribution is neither lost nor attributed to the closing period.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::mem;
use std::path::Path;

use crate::constants::*;
use crate::context::{Context, Snapshot};
use crate::error::*;
use crate::event::{parse_event_line, Event, GamePhase, PositionEvent};

/// A batch of in-play position events plus the metadata consumers need to
/// analyse it in isolation.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Contiguous slice of the stream, in stream order.
    pub data: Vec<PositionEvent>,
    /// True when this batch closes a statistics period (or the stream).
    pub is_period_last: bool,
    /// Field state immediately before the first event of `data` was applied.
    pub snapshot: Snapshot,
    /// Timestamp of the first event in `data`, or of the triggering event
    /// for an empty batch.
    pub initial_ts: u64,
    /// Timestamp of the last event in `data`, or of the triggering event
    /// for an empty batch.
    pub final_ts: u64,
}

impl Batch {
    /// Time spanned between the first and last event of the batch.
    pub fn interval(&self) -> u64 {
        self.final_ts - self.initial_ts
    }
}

/// Stateful consumer of the streaming game events. See the module
/// documentation for the batching rules.
pub struct EventFetcher<R> {
    reader: R,
    context: Context,
    batch_size: usize,
    period: u64,
    period_start: u64,
    batch: Vec<PositionEvent>,
    carry: Vec<PositionEvent>,
    snapshot: Snapshot,
    game_paused: bool,
    game_over: bool,
    last_in_game_ts: u64,
}

impl EventFetcher<BufReader<File>> {
    /// Fetches events from the stream file at `path`.
    pub fn from_file(
        path: &Path,
        time_units: u32,
        batch_size: usize,
        context: Context,
    ) -> MonitorResult<Self> {
        let file = File::open(path).map_err(|err| {
            MonitorError::new(MonitorErrorVariant::StreamRead(format!(
                "{}: {}",
                path.display(),
                err
            )))
        })?;
        Ok(Self::new(BufReader::new(file), time_units, batch_size, context))
    }
}

impl EventFetcher<Cursor<String>> {
    /// Fetches events from an in-memory dataset string.
    pub fn from_dataset(
        dataset: &str,
        time_units: u32,
        batch_size: usize,
        context: Context,
    ) -> Self {
        Self::new(Cursor::new(dataset.to_string()), time_units, batch_size, context)
    }
}

impl<R: BufRead> EventFetcher<R> {
    pub fn new(reader: R, time_units: u32, batch_size: usize, context: Context) -> Self {
        let snapshot = context.snapshot();
        Self {
            reader,
            context,
            batch_size,
            period: time_units as u64 * PICOS_PER_SECOND,
            period_start: GAME_START,
            batch: Vec::with_capacity(batch_size),
            carry: Vec::new(),
            snapshot,
            game_paused: false,
            game_over: false,
            last_in_game_ts: GAME_START,
        }
    }

    /// The field state as tracked so far. Reflects every position event
    /// consumed, including those outside play.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Produces the next batch, or `None` once the stream is exhausted.
    /// Parse failures abort the sequence.
    pub fn next_batch(&mut self) -> MonitorResult<Option<Batch>> {
        if self.game_over {
            return Ok(None);
        }

        let mut line = String::new();
        loop {
            line.clear();
            let read = self.reader.read_line(&mut line).map_err(|err| {
                MonitorError::new(MonitorErrorVariant::StreamRead(err.to_string()))
            })?;
            if read == 0 {
                return Ok(Some(self.final_batch()));
            }

            let event = match parse_event_line(line.trim_end())? {
                Event::Interruption(_) => {
                    self.game_paused = true;
                    continue;
                }
                Event::Resume(_) => {
                    self.game_paused = false;
                    continue;
                }
                Event::Position(event) => event,
            };

            // Referee and unused sensors are not ours to track.
            if !self.context.is_known_sensor(event.sid) {
                log::trace!("dropping event for unregistered sensor {}", event.sid);
                continue;
            }

            let phase = GamePhase::of(event.timestamp);
            if phase == GamePhase::InPlay {
                self.last_in_game_ts = event.timestamp;
            }

            if phase == GamePhase::InPlay && event.timestamp >= self.period_start + self.period {
                return Ok(Some(self.close_period(event)?));
            } else if self.game_paused && !self.batch.is_empty() && phase == GamePhase::InPlay {
                self.context.apply(&event)?;
                return Ok(Some(self.emit(false, event.timestamp)));
            } else if phase == GamePhase::Break && !self.batch.is_empty() {
                self.context.apply(&event)?;
                return Ok(Some(self.emit(true, event.timestamp)));
            } else if phase == GamePhase::InPlay && !self.game_paused {
                if self.batch.is_empty() {
                    if self.carry.is_empty() {
                        self.snapshot = self.context.snapshot();
                    } else {
                        self.batch.append(&mut self.carry);
                    }
                }
                self.batch.push(event);
                self.context.apply(&event)?;
                if self.batch.len() >= self.batch_size {
                    return Ok(Some(self.emit(false, event.timestamp)));
                }
            } else {
                // Out of play and nothing to flush: the field keeps tracking.
                self.context.apply(&event)?;
            }
        }
    }

    /// A period of game time elapsed. The triggering event belongs to the
    /// next period: park it in the carry bucket (under a freshly taken
    /// snapshot) and flush the closing period's batch.
    fn close_period(&mut self, event: PositionEvent) -> MonitorResult<Batch> {
        self.period_start += self.period;
        let prev = if self.game_paused {
            self.snapshot.clone()
        } else {
            let fresh = self.context.snapshot();
            self.carry.push(event);
            mem::replace(&mut self.snapshot, fresh)
        };
        self.context.apply(&event)?;

        let data = mem::take(&mut self.batch);
        let (initial_ts, final_ts) = Self::bounds(&data, event.timestamp);
        Ok(Batch {
            data,
            is_period_last: true,
            snapshot: prev,
            initial_ts,
            final_ts,
        })
    }

    fn emit(&mut self, is_period_last: bool, trigger_ts: u64) -> Batch {
        let data = mem::take(&mut self.batch);
        let (initial_ts, final_ts) = Self::bounds(&data, trigger_ts);
        Batch {
            data,
            is_period_last,
            snapshot: self.snapshot.clone(),
            initial_ts,
            final_ts,
        }
    }

    /// Flushes whatever remains once the stream is exhausted, including any
    /// carried event that never saw a successor boundary.
    fn final_batch(&mut self) -> Batch {
        self.game_over = true;
        if self.batch.is_empty() {
            self.batch = mem::take(&mut self.carry);
        }
        self.emit(true, self.last_in_game_ts)
    }

    fn bounds(data: &[PositionEvent], fallback_ts: u64) -> (u64, u64) {
        match (data.first(), data.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => (fallback_ts, fallback_ts),
        }
    }

    /// Borrowing iterator over the remaining batches.
    pub fn batches(&mut self) -> Batches<'_, R> {
        Batches { fetcher: self }
    }
}

/// Iterator adapter over [`EventFetcher::next_batch`], tied to the
/// fetcher's lifetime.
pub struct Batches<'a, R> {
    fetcher: &'a mut EventFetcher<R>,
}

impl<R: BufRead> Iterator for Batches<'_, R> {
    type Item = MonitorResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.fetcher.next_batch().transpose()
    }
}
