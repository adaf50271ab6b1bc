//! Ball-possession statistics.
//!
//! For each incoming [`Batch`] the engine scans the events once per player,
//! in parallel: every worker owns private copies of the snapshot's ball and
//! player positions, replays the batch against them, and samples its
//! player's distance to the ball at every ball event. The per-player
//! distance series are then reduced sequentially — in player registration
//! order — to a per-instant closest-player decision, so the outcome depends
//! only on the input, never on thread interleaving.
//!
//! A sampled distance is *eligible* when it is within the configured maximum
//! distance (metres); ineligible samples are recorded as
//! [`INFINITE_DISTANCE`] so they can never win the minimum. An instant whose
//! minimum stays infinite has no owner and counts towards nobody.

use std::collections::{HashMap, HashSet};

use float_ord::FloatOrd;
use rayon::prelude::*;
use serde::Serialize;

use crate::constants::{BALL_KEY, UNITS_PER_METER};
use crate::context::Context;
use crate::error::*;
use crate::fetcher::Batch;
use crate::position::{euclidean, Position};

/// Sentinel for "not eligible at this instant".
pub const INFINITE_DISTANCE: f64 = f64::INFINITY;

/// Owner of an instant at which no player was within the maximum distance.
pub const NONE_PLAYER: &str = "None";

/// The distance series of one player: the player's distance to the ball at
/// each ball event of a batch.
#[derive(Debug, Clone)]
pub struct DistanceResults {
    player_name: String,
    distances: Vec<f64>,
}

impl DistanceResults {
    pub fn new(player_name: String) -> Self {
        Self {
            player_name,
            distances: Vec::new(),
        }
    }

    pub fn push(&mut self, distance: f64) {
        self.distances.push(distance);
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.distances.iter().copied()
    }
}

/// Per-instant closest-player decision, built by folding one
/// [`DistanceResults`] after another.
///
/// Reduction uses strict less-than, so on equal distances the player reduced
/// first wins; callers reduce in player registration order to keep the
/// decision deterministic.
#[derive(Debug, Clone, Default)]
pub struct BallPossession {
    closest_players: Vec<String>,
    min_distances: Vec<f64>,
}

impl BallPossession {
    pub fn reduce(&mut self, distance: &DistanceResults) {
        if self.min_distances.is_empty() {
            self.min_distances.extend(distance.iter());
            for d in distance.iter() {
                if d == INFINITE_DISTANCE {
                    self.closest_players.push(NONE_PLAYER.to_string());
                } else {
                    self.closest_players.push(distance.player_name().to_string());
                }
            }
        } else {
            debug_assert_eq!(self.min_distances.len(), distance.len());
            for (i, d) in distance.iter().enumerate() {
                if FloatOrd(d) < FloatOrd(self.min_distances[i]) {
                    self.min_distances[i] = d;
                    self.closest_players[i] = distance.player_name().to_string();
                }
            }
        }
    }

    /// (owner, distance) per ball event, in stream order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.closest_players
            .iter()
            .map(String::as_str)
            .zip(self.min_distances.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.min_distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.min_distances.is_empty()
    }
}

/// Per-period and whole-game possession shares, exportable as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PossessionSummary {
    /// One normalised distribution per closed period.
    pub partials: Vec<HashMap<String, f64>>,
    /// Normalised distribution over the whole game so far.
    pub game: HashMap<String, f64>,
}

impl PossessionSummary {
    pub fn as_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn as_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The statistics engine: folds batches into a per-period accumulator and a
/// whole-game accumulator.
///
/// The engine clones the immutable player registry out of the [`Context`] at
/// construction; afterwards it only ever reads batch snapshots, so it shares
/// no state with the stream driver.
pub struct GameStatistics {
    maximum_distance: f64,
    player_names: Vec<String>,
    player_sids: HashMap<String, Vec<u32>>,
    ball_sids: HashSet<u32>,
    partials: Vec<HashMap<String, f64>>,
    accumulator: HashMap<String, u32>,
    game_accumulator: HashMap<String, u32>,
}

impl GameStatistics {
    /// `maximum_distance` is in metres; sampled distances are in sensor
    /// units and divided by [`UNITS_PER_METER`] before the comparison.
    pub fn new(maximum_distance: f64, context: &Context) -> Self {
        let player_names: Vec<String> = context.players().player_names().to_vec();
        let player_sids = player_names
            .iter()
            .map(|name| {
                let sids = context.players().sids_of(name).unwrap_or(&[]).to_vec();
                (name.clone(), sids)
            })
            .collect();
        let ball_sids = context.balls().sids().iter().copied().collect();
        Self {
            maximum_distance,
            player_names,
            player_sids,
            ball_sids,
            partials: Vec::new(),
            accumulator: HashMap::new(),
            game_accumulator: HashMap::new(),
        }
    }

    /// Folds one batch into the accumulators. On a period-closing batch the
    /// normalised partial is recorded and the period accumulator folded into
    /// the game accumulator.
    pub fn batch_stats(&mut self, batch: &Batch) -> MonitorResult<()> {
        let results: Vec<DistanceResults> = self
            .player_names
            .par_iter()
            .map(|name| self.player_distances(name, batch))
            .collect::<MonitorResult<Vec<_>>>()?;

        let mut possession = BallPossession::default();
        for distance in &results {
            possession.reduce(distance);
        }

        for (owner, _) in possession.iter() {
            if owner != NONE_PLAYER {
                *self.accumulator.entry(owner.to_string()).or_insert(0) += 1;
            }
        }

        if batch.is_period_last {
            self.partials.push(self.accumulated_stats());
            for (name, count) in self.accumulator.drain() {
                *self.game_accumulator.entry(name).or_insert(0) += count;
            }
        }
        Ok(())
    }

    /// One worker's pass over the batch: replay the events against private
    /// copies of this player's and the ball's snapshot positions, sampling
    /// at every ball event.
    fn player_distances(&self, name: &str, batch: &Batch) -> MonitorResult<DistanceResults> {
        let mut player_position = self.snapshot_position(batch, name)?;
        let mut ball_position = self.snapshot_position(batch, BALL_KEY)?;
        let empty = Vec::new();
        let my_sids = self.player_sids.get(name).unwrap_or(&empty);

        let mut results = DistanceResults::new(name.to_string());
        for event in &batch.data {
            if self.ball_sids.contains(&event.sid) {
                ball_position.update_sensor(event.sid, event.coordinates())?;
                let distance = euclidean(ball_position.vector(), player_position.vector());
                if distance / UNITS_PER_METER <= self.maximum_distance {
                    results.push(distance);
                } else {
                    results.push(INFINITE_DISTANCE);
                }
            } else if my_sids.contains(&event.sid) {
                player_position.update_sensor(event.sid, event.coordinates())?;
            }
        }
        Ok(results)
    }

    fn snapshot_position(&self, batch: &Batch, name: &str) -> MonitorResult<Position> {
        batch.snapshot.get(name).cloned().ok_or_else(|| {
            MonitorError::new(MonitorErrorVariant::MissingFromSnapshot {
                name: name.to_string(),
            })
        })
    }

    /// Normalised distribution of the current period accumulator over all
    /// registered players. All-zero when the period saw no eligible sample.
    pub fn accumulated_stats(&self) -> HashMap<String, f64> {
        Self::normalized(&self.player_names, &self.accumulator)
    }

    /// The most recently closed period's distribution.
    pub fn last_partial(&self) -> Option<&HashMap<String, f64>> {
        self.partials.last()
    }

    /// Every closed period's distribution, in emission order.
    pub fn partials(&self) -> &[HashMap<String, f64>] {
        &self.partials
    }

    /// Normalised whole-game distribution over all closed periods.
    pub fn game_stats(&self) -> HashMap<String, f64> {
        Self::normalized(&self.player_names, &self.game_accumulator)
    }

    pub fn summary(&self) -> PossessionSummary {
        PossessionSummary {
            partials: self.partials.clone(),
            game: self.game_stats(),
        }
    }

    fn normalized(names: &[String], counts: &HashMap<String, u32>) -> HashMap<String, f64> {
        let total: u32 = counts.values().sum();
        names
            .iter()
            .map(|name| {
                let count = counts.get(name).copied().unwrap_or(0);
                let share = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                };
                (name.clone(), share)
            })
            .collect()
    }
}
