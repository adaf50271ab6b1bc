//! Match metadata: which sensor belongs to which player or ball, and which
//! team each player plays for.
//!
//! The metadata file carries one record per line:
//!
//! - `BALL,<group_id>,<sid>` registers a ball sensor;
//! - `PLAYER,<A|B>,<name>,<sid1>,<sid2>,<sid3>,<sid4>` registers a player,
//!   with zero-valued sensor ids standing for unused slots.
//!
//! Unknown or malformed lines are logged and skipped. Player registration
//! order is preserved: it fixes the deterministic iteration order used for
//! tie-breaking in the possession reduction.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::*;
use crate::position::{BallPosition, PlayerPosition, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Team {
    A,
    B,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => write!(f, "A"),
            Team::B => write!(f, "B"),
        }
    }
}

/// Sensor-to-player registry, preserving player registration order.
#[derive(Debug, Clone, Default)]
pub struct PlayerMap {
    names: Vec<String>,
    sensor_to_player: HashMap<u32, String>,
    player_sids: HashMap<String, Vec<u32>>,
}

impl PlayerMap {
    pub fn add_player(&mut self, name: &str, sids: &[u32]) {
        self.names.push(name.to_string());
        for &sid in sids {
            self.sensor_to_player.insert(sid, name.to_string());
        }
        self.player_sids.insert(name.to_string(), sids.to_vec());
    }

    pub fn is_player(&self, sid: u32) -> bool {
        self.sensor_to_player.contains_key(&sid)
    }

    pub fn name_of(&self, sid: u32) -> Option<&str> {
        self.sensor_to_player.get(&sid).map(String::as_str)
    }

    /// Player names in registration order.
    pub fn player_names(&self) -> &[String] {
        &self.names
    }

    pub fn sids_of(&self, name: &str) -> Option<&[u32]> {
        self.player_sids.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Player-to-team registry.
#[derive(Debug, Clone, Default)]
pub struct TeamMap {
    teams: HashMap<String, Team>,
}

impl TeamMap {
    pub fn add_player(&mut self, name: &str, team: Team) {
        self.teams.insert(name.to_string(), team);
    }

    pub fn team_of(&self, name: &str) -> Option<Team> {
        self.teams.get(name).copied()
    }
}

/// Registry of the ball sensors of the match.
#[derive(Debug, Clone, Default)]
pub struct BallMap {
    sids: Vec<u32>,
}

impl BallMap {
    pub fn add_ball(&mut self, sid: u32) {
        self.sids.push(sid);
    }

    pub fn is_ball(&self, sid: u32) -> bool {
        self.sids.contains(&sid)
    }

    pub fn sids(&self) -> &[u32] {
        &self.sids
    }
}

/// The parsed metadata file: registries plus the initial position table
/// (one [`Position`] per player, one for all the balls together).
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub players: PlayerMap,
    pub teams: TeamMap,
    pub balls: BallMap,
    pub positions: Vec<Position>,
}

/// Parses metadata records from an in-memory string.
pub fn parse_metadata(content: &str) -> Metadata {
    let mut meta = Metadata::default();
    let mut ball_position = BallPosition::new();

    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        match fields[0] {
            "PLAYER" if fields.len() >= 4 => {
                let team = match fields[1] {
                    "A" => Team::A,
                    "B" => Team::B,
                    other => {
                        log::warn!("skipping player {:?} with unknown team {:?}", fields[2], other);
                        continue;
                    }
                };
                let name = fields[2];
                let sids: Vec<u32> = fields[3..]
                    .iter()
                    .filter_map(|f| f.parse().ok())
                    .filter(|&sid| sid != 0)
                    .collect();
                if sids.is_empty() {
                    log::warn!("skipping player {:?} with no sensors", name);
                    continue;
                }
                let mut position = PlayerPosition::new();
                for &sid in &sids {
                    position.add_sensor(sid);
                }
                meta.players.add_player(name, &sids);
                meta.teams.add_player(name, team);
                meta.positions.push(Position::Player(position));
            }
            "BALL" if fields.len() >= 3 => match fields[2].parse() {
                Ok(sid) => {
                    meta.balls.add_ball(sid);
                    ball_position.add_sensor(sid);
                }
                Err(_) => log::warn!("skipping ball record with bad sensor id: {:?}", line),
            },
            _ => log::warn!("skipping unknown metadata line: {:?}", line),
        }
    }

    if !ball_position.sids().is_empty() {
        meta.positions.push(Position::Ball(ball_position));
    }
    meta
}

/// Loads and parses the metadata file. A missing or unreadable file is fatal
/// at startup.
pub fn load_metadata(path: &Path) -> MonitorResult<Metadata> {
    let content = fs::read_to_string(path).map_err(|err| {
        MonitorError::new(MonitorErrorVariant::MetadataNotFound {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    })?;
    Ok(parse_metadata(&content))
}
