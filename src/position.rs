//! Per-entity sensor positions.
//!
//! A [`PlayerPosition`] reports the component-wise mean of its sensors (each
//! limb of a player carries its own sensor). A [`BallPosition`] tracks every
//! ball sensor of the match but reports only the *in-play* ball — the most
//! recently updated sensor whose (x, y) lies inside the field rectangle — or
//! an infinite vector when no ball is in play, which makes out-of-play balls
//! ineligible for any distance-based decision downstream.

use glam::DVec3;

use crate::constants::is_inside_field;
use crate::error::*;

/// Position of a player, aggregated over the sensors the player wears.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPosition {
    sids: Vec<u32>,
    xs: Vec<i32>,
    ys: Vec<i32>,
    zs: Vec<i32>,
}

impl PlayerPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sensor(&mut self, sid: u32) {
        self.sids.push(sid);
        self.xs.push(0);
        self.ys.push(0);
        self.zs.push(0);
    }

    pub fn update_sensor(&mut self, sid: u32, (x, y, z): (i32, i32, i32)) -> MonitorResult<()> {
        let idx = self.sid_index(sid)?;
        self.xs[idx] = x;
        self.ys[idx] = y;
        self.zs[idx] = z;
        Ok(())
    }

    /// Component-wise mean over all worn sensors.
    pub fn vector(&self) -> DVec3 {
        DVec3::new(mean(&self.xs), mean(&self.ys), mean(&self.zs))
    }

    pub fn sids(&self) -> &[u32] {
        &self.sids
    }

    fn sid_index(&self, sid: u32) -> MonitorResult<usize> {
        self.sids
            .iter()
            .position(|&s| s == sid)
            .ok_or_else(|| MonitorError::new(MonitorErrorVariant::UnknownSensor { sid }))
    }
}

/// Position of the game ball.
///
/// Several balls are on the sidelines at any time; `in_play` indexes the one
/// currently inside the field, if any. A ball leaving the field clears the
/// index again, so [`BallPosition::vector`] is infinite exactly while no
/// ball is in play.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BallPosition {
    in_play: Option<usize>,
    sids: Vec<u32>,
    xs: Vec<i32>,
    ys: Vec<i32>,
    zs: Vec<i32>,
}

impl BallPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sensor(&mut self, sid: u32) {
        self.sids.push(sid);
        self.xs.push(0);
        self.ys.push(0);
        self.zs.push(0);
    }

    pub fn update_sensor(&mut self, sid: u32, (x, y, z): (i32, i32, i32)) -> MonitorResult<()> {
        let idx = self.sid_index(sid)?;
        self.xs[idx] = x;
        self.ys[idx] = y;
        self.zs[idx] = z;

        if is_inside_field(x, y) {
            self.in_play = Some(idx);
        } else if self.in_play == Some(idx) {
            self.in_play = None;
        }
        Ok(())
    }

    /// Coordinates of the in-play ball, or an infinite vector when every
    /// ball is outside the field.
    pub fn vector(&self) -> DVec3 {
        match self.in_play {
            Some(idx) => DVec3::new(
                self.xs[idx] as f64,
                self.ys[idx] as f64,
                self.zs[idx] as f64,
            ),
            None => DVec3::INFINITY,
        }
    }

    pub fn in_play_sid(&self) -> Option<u32> {
        self.in_play.map(|idx| self.sids[idx])
    }

    pub fn sids(&self) -> &[u32] {
        &self.sids
    }

    fn sid_index(&self, sid: u32) -> MonitorResult<usize> {
        self.sids
            .iter()
            .position(|&s| s == sid)
            .ok_or_else(|| MonitorError::new(MonitorErrorVariant::UnknownSensor { sid }))
    }
}

/// A field entity's position: either the ball or a player.
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    Ball(BallPosition),
    Player(PlayerPosition),
}

impl Position {
    pub fn vector(&self) -> DVec3 {
        match self {
            Position::Ball(ball) => ball.vector(),
            Position::Player(player) => player.vector(),
        }
    }

    pub fn update_sensor(&mut self, sid: u32, vector: (i32, i32, i32)) -> MonitorResult<()> {
        match self {
            Position::Ball(ball) => ball.update_sensor(sid, vector),
            Position::Player(player) => player.update_sensor(sid, vector),
        }
    }

    pub fn sids(&self) -> &[u32] {
        match self {
            Position::Ball(ball) => ball.sids(),
            Position::Player(player) => player.sids(),
        }
    }
}

fn mean(values: &[i32]) -> f64 {
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    sum / values.len() as f64
}

/// Euclidean distance between two reported positions, in sensor units.
pub fn euclidean(a: DVec3, b: DVec3) -> f64 {
    a.distance(b)
}
