#![allow(clippy::result_large_err)]

//! # soccer-monitor
//!
//! [`soccer-monitor`](crate) turns the raw sensor stream of the DEBS 2013
//! soccer-monitoring dataset into periodic ball-possession statistics.
//! Sensors worn by the players and embedded in the balls report their
//! position at picosecond-granularity timestamps; this crate parses that
//! line stream, tracks the field state through interruptions and the
//! half-time break, and emits — every `time_units` seconds of game time —
//! the share of ball possession of every player, together with a running
//! aggregate for the entire match.
//!
//! ## Overview of Key Components
//!
//! - **[`EventFetcher`]**: the stateful stream driver. It parses one line at
//!   a time into an [`Event`], keeps the [`Context`] up to date with every
//!   position report (in or out of play), and assembles in-play events into
//!   [`Batch`] values. Each batch carries a [`Snapshot`] of the field taken
//!   immediately before its first event, an `is_period_last` flag marking
//!   statistics-period boundaries, and the timestamps it spans. The event
//!   that triggers a period boundary belongs to the *next* period and is
//!   carried over into the following batch.
//!
//! - **[`Context`]**: the field state — the player/team/ball registries
//!   loaded from the metadata file plus the current [`Position`] of every
//!   sensor-bearing entity. It is mutated only by the fetcher; consumers
//!   work on value-typed snapshots, so no locking is ever needed.
//!
//! - **[`GameStatistics`]**: the possession engine. For every batch it
//!   replays the events once per player — in parallel, each worker owning
//!   private copies of the snapshot positions — sampling the player's
//!   distance to the in-play ball at every ball event, then reduces the
//!   distance series to a per-instant closest-player decision and folds the
//!   result into per-period and whole-game accumulators. The reduction is
//!   sequential in player registration order, so the outcome is independent
//!   of thread scheduling.
//!
//! - **[`Visualizer`]**: renders a closed period (or the final aggregate) as
//!   a text table with a running game clock, team totals and one row per
//!   player.
//!
//! ## Example
//!
//! ```no_run
//! use soccer_monitor::*;
//! use std::path::Path;
//!
//! fn possession_per_minute(stream: &Path, metadata: &Path) -> MonitorResult<PossessionSummary> {
//!     let context = Context::build_from(metadata)?;
//!     let mut stats = GameStatistics::new(2.0, &context);
//!     let mut fetcher = EventFetcher::from_file(stream, 60, 1500, context)?;
//!     while let Some(batch) = fetcher.next_batch()? {
//!         stats.batch_stats(&batch)?;
//!     }
//!     Ok(stats.summary())
//! }
//! ```

pub mod constants;
pub mod context;
pub mod error;
pub mod event;
pub mod fetcher;
pub mod metadata;
pub mod monitor;
pub mod position;
pub mod stats;
pub mod visualizer;


pub use crate::constants::*;
pub use crate::context::*;
pub use crate::error::*;
pub use crate::event::*;
pub use crate::fetcher::*;
pub use crate::metadata::*;
pub use crate::monitor::*;
pub use crate::position::*;
pub use crate::stats::*;
pub use crate::visualizer::*;
