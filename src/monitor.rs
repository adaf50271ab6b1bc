//! Top-level pipeline driver: metadata → context → fetcher → statistics →
//! renderer.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use crate::context::Context;
use crate::error::*;
use crate::fetcher::EventFetcher;
use crate::stats::GameStatistics;
use crate::visualizer::Visualizer;

fn output_error(err: io::Error) -> MonitorError {
    MonitorError::new(MonitorErrorVariant::OutputWrite(err.to_string()))
}

/// Runs the whole monitoring pipeline over the stream file, rendering one
/// possession table per `time_units` seconds of game time and a final table
/// at end of stream.
pub fn run_game_monitoring(
    time_units: u32,
    maximum_distance: f64,
    game_data: &Path,
    metadata: &Path,
    batch_size: usize,
    output: Option<&Path>,
) -> MonitorResult<()> {
    let context = Context::build_from(metadata)?;

    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path).map_err(output_error)?),
        None => Box::new(io::stdout()),
    };
    let mut visualizer = Visualizer::new(context.players(), context.teams(), time_units, out);
    let mut stats = GameStatistics::new(maximum_distance, &context);
    let mut fetcher = EventFetcher::from_file(game_data, time_units, batch_size, context)?;

    visualizer.draw().map_err(output_error)?;
    let mut period_timer = Instant::now();
    while let Some(batch) = fetcher.next_batch()? {
        stats.batch_stats(&batch)?;

        if batch.is_period_last {
            log::info!(
                "processed {} seconds of the stream in {:.3} seconds",
                time_units,
                period_timer.elapsed().as_secs_f64()
            );
            period_timer = Instant::now();
            if let Some(partial) = stats.last_partial() {
                visualizer
                    .draw_stats(partial, false, batch.final_ts)
                    .map_err(output_error)?;
            }
        }
    }

    visualizer
        .draw_final_stats(&stats.game_stats())
        .map_err(output_error)
}
