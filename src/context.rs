//! Field state: the registries plus the current [`Position`] of every
//! sensor-bearing entity, with value-typed snapshotting for batch-parallel
//! consumers.
//!
//! The context is mutated only by the stream driver. Consumers never read it
//! live; they receive a [`Snapshot`] — a deep copy of every position, keyed
//! by player name plus the [`BALL_KEY`] entry — taken immediately before the
//! first event of the batch they are about to analyse.

use std::collections::HashMap;
use std::path::Path;

use crate::constants::BALL_KEY;
use crate::error::*;
use crate::event::PositionEvent;
use crate::metadata::{self, BallMap, Metadata, PlayerMap, TeamMap};
use crate::position::Position;

/// A value-typed copy of the field state: player name → position, plus the
/// [`BALL_KEY`] entry for the ball. Independent of later context mutation.
pub type Snapshot = HashMap<String, Position>;

#[derive(Debug, Clone, Default)]
pub struct Context {
    players: PlayerMap,
    teams: TeamMap,
    balls: BallMap,
    positions: Vec<Position>,
    sid_to_position: HashMap<u32, usize>,
    ball_position: Option<usize>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the context from parsed metadata.
    pub fn from_metadata(meta: Metadata) -> Self {
        let mut context = Context {
            players: meta.players,
            teams: meta.teams,
            balls: meta.balls,
            ..Context::default()
        };
        for position in meta.positions {
            context.add_position(position);
        }
        context
    }

    /// Builds the context from the metadata file at `path`.
    pub fn build_from(path: &Path) -> MonitorResult<Self> {
        Ok(Self::from_metadata(metadata::load_metadata(path)?))
    }

    /// Registers a position and indexes it under each of its sensor ids.
    pub fn add_position(&mut self, position: Position) {
        let idx = self.positions.len();
        for &sid in position.sids() {
            self.sid_to_position.insert(sid, idx);
        }
        if matches!(position, Position::Ball(_)) {
            self.ball_position = Some(idx);
        }
        self.positions.push(position);
    }

    pub fn players(&self) -> &PlayerMap {
        &self.players
    }

    pub fn teams(&self) -> &TeamMap {
        &self.teams
    }

    pub fn balls(&self) -> &BallMap {
        &self.balls
    }

    /// Whether the sensor belongs to a registered player or ball. The stream
    /// also carries referee and unused sensors; those are unknown here.
    pub fn is_known_sensor(&self, sid: u32) -> bool {
        self.sid_to_position.contains_key(&sid)
    }

    pub fn position(&self, sid: u32) -> Option<&Position> {
        self.sid_to_position.get(&sid).map(|&idx| &self.positions[idx])
    }

    /// Applies a position event to the entity owning its sensor. Calling
    /// this with an unregistered sensor is a logic error.
    pub fn apply(&mut self, event: &PositionEvent) -> MonitorResult<()> {
        let idx = *self.sid_to_position.get(&event.sid).ok_or_else(|| {
            MonitorError::new(MonitorErrorVariant::NoPositionForSensor { sid: event.sid })
        })?;
        self.positions[idx].update_sensor(event.sid, event.coordinates())
    }

    /// Takes a deep copy of the current field state.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = HashMap::with_capacity(self.players.len() + 1);
        for name in self.players.player_names() {
            let position = self
                .players
                .sids_of(name)
                .and_then(|sids| sids.first())
                .and_then(|&sid| self.position(sid));
            if let Some(position) = position {
                snapshot.insert(name.clone(), position.clone());
            }
        }
        if let Some(idx) = self.ball_position {
            snapshot.insert(BALL_KEY.to_string(), self.positions[idx].clone());
        }
        snapshot
    }
}
