//! Text-table rendering of the per-period possession statistics.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::constants::*;
use crate::metadata::{PlayerMap, Team, TeamMap};

const NAME_WIDTH: usize = 20;
const TEAM_WIDTH: usize = 8;
const VALUE_WIDTH: usize = 15;
const TABLE_WIDTH: usize = 2 + NAME_WIDTH + TEAM_WIDTH + VALUE_WIDTH + 2;

/// Renders possession partials as a text table: a team header with the
/// running game clock, the renormalised team totals, then one row per
/// player — team A first, then team B, alphabetical within each team.
pub struct Visualizer<W> {
    teams: TeamMap,
    out: W,
    time_units: u32,
    display_order: Vec<String>,
    partials: HashMap<String, f64>,
    team_a_partial: f64,
    team_b_partial: f64,
    game_time_secs: u64,
}

impl<W: Write> Visualizer<W> {
    pub fn new(players: &PlayerMap, teams: &TeamMap, time_units: u32, out: W) -> Self {
        let mut display_order: Vec<String> = players.player_names().to_vec();
        display_order.sort_by_key(|name| {
            let team_rank = match teams.team_of(name) {
                Some(Team::A) => 0,
                _ => 1,
            };
            (team_rank, name.clone())
        });
        let partials = display_order.iter().map(|name| (name.clone(), 0.0)).collect();
        Self {
            teams: teams.clone(),
            out,
            time_units,
            display_order,
            partials,
            team_a_partial: 0.0,
            team_b_partial: 0.0,
            game_time_secs: 0,
        }
    }

    /// Renders one period's partial. `last_ts` drives the game clock.
    pub fn draw_stats(
        &mut self,
        partial: &HashMap<String, f64>,
        is_game_end: bool,
        last_ts: u64,
    ) -> io::Result<()> {
        self.update_stats(partial, is_game_end, last_ts);
        self.draw()
    }

    /// Renders the end-of-game table.
    pub fn draw_final_stats(&mut self, game_stats: &HashMap<String, f64>) -> io::Result<()> {
        self.update_stats(game_stats, true, 0);
        writeln!(self.out, "--------- Game End. Final Statistics ----------\n")?;
        self.draw()
    }

    pub fn draw(&mut self) -> io::Result<()> {
        self.draw_separator()?;
        self.draw_teams_header()?;
        self.draw_teams_entry()?;

        self.draw_separator()?;
        self.draw_players_header()?;
        self.draw_separator()?;
        for name in self.display_order.clone() {
            let percentage = self.partials.get(&name).copied().unwrap_or(0.0);
            self.draw_entry(&name, percentage)?;
        }
        self.draw_separator()?;
        writeln!(self.out)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn update_stats(&mut self, partial: &HashMap<String, f64>, is_game_end: bool, last_ts: u64) {
        self.team_a_partial = 0.0;
        self.team_b_partial = 0.0;

        for name in &self.display_order {
            let percentage = partial.get(name).copied().unwrap_or(0.0);
            self.partials.insert(name.clone(), percentage);
            match self.teams.team_of(name) {
                Some(Team::A) => self.team_a_partial += percentage,
                _ => self.team_b_partial += percentage,
            }
        }

        // Header row is renormalised over the two team totals.
        let total = self.team_a_partial + self.team_b_partial;
        if total == 0.0 {
            self.team_a_partial = 0.0;
            self.team_b_partial = 0.0;
        } else {
            self.team_a_partial /= total;
            self.team_b_partial /= total;
        }

        if !is_game_end {
            self.update_game_time(last_ts);
        }
    }

    fn update_game_time(&mut self, last_ts: u64) {
        if last_ts >= GAME_START {
            // Millisecond epsilon to round the clock off.
            let ts = last_ts + PICOS_PER_MILLISECOND;
            self.game_time_secs = if ts <= BREAK_START {
                (ts - GAME_START) / PICOS_PER_SECOND
            } else if ts < BREAK_END {
                (BREAK_START - GAME_START) / PICOS_PER_SECOND
            } else {
                (BREAK_START - GAME_START + (ts - BREAK_END)) / PICOS_PER_SECOND
            };
        } else {
            self.game_time_secs += self.time_units as u64;
        }
    }

    fn draw_separator(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(TABLE_WIDTH))
    }

    fn draw_teams_header(&mut self) -> io::Result<()> {
        let minutes = self.game_time_secs / 60;
        let seconds = self.game_time_secs % 60;
        writeln!(
            self.out,
            "{:<2}{:>17}  {:02}:{:02}  {:<17}{:>2}",
            "|", "Team A", minutes, seconds, "Team B", "|"
        )
    }

    fn draw_teams_entry(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "{:<2}{:>17.2}    %    {:<17.2}{:>2}",
            "|",
            self.team_a_partial * 100.0,
            self.team_b_partial * 100.0,
            "|"
        )
    }

    fn draw_players_header(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "{:<2}{:<NAME_WIDTH$}{:<TEAM_WIDTH$}{:>VALUE_WIDTH$}{:>2}",
            "|", "Player", "Team", "Ball Possession", "|"
        )
    }

    fn draw_entry(&mut self, name: &str, percentage: f64) -> io::Result<()> {
        let team = self
            .teams
            .team_of(name)
            .map(|t| t.to_string())
            .unwrap_or_default();
        let percentage = format!("{:02.2}%", percentage * 100.0);
        writeln!(
            self.out,
            "{:<2}{:<NAME_WIDTH$}{:<TEAM_WIDTH$}{:>VALUE_WIDTH$}{:>2}",
            "|", name, team, percentage, "|"
        )
    }
}
