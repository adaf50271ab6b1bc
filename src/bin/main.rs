use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use soccer_monitor::run_game_monitoring;

/// DEBS 2013 - Soccer Monitoring tool
#[derive(Parser, Debug)]
#[command(name = "soccer-monitor", version, about)]
struct Args {
    /// Frequency of statistics (in seconds)
    #[arg(short = 'T', long, value_parser = clap::value_parser!(u32).range(1..=60))]
    time_units: u32,

    /// Maximum distance for ball possession eligibility (metres)
    #[arg(short = 'K', long)]
    max_distance: f64,

    /// Game stream file path
    #[arg(short = 's', long)]
    stream: PathBuf,

    /// Metadata file path
    #[arg(short = 'm', long)]
    metadata: PathBuf,

    /// Number of threads (0 means all logical cores)
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// Events batch size
    #[arg(short = 'B', long, default_value_t = 1500, value_parser = clap::value_parser!(u32).range(1..))]
    batch_size: u32,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn run(args: Args) -> anyhow::Result<()> {
    if !(1.0..=5.0).contains(&args.max_distance) {
        bail!(
            "Invalid value for --max-distance: {}. Valid range: [1.0, 5.0]",
            args.max_distance
        );
    }
    for (flag, path) in [("--stream", &args.stream), ("--metadata", &args.metadata)] {
        let readable = path.is_file() && path.metadata().map(|m| m.len() > 0).unwrap_or(false);
        if !readable {
            bail!(
                "Invalid value for {}. {} is not a non-empty regular file.",
                flag,
                path.display()
            );
        }
    }

    let cores = std::thread::available_parallelism().map(usize::from).unwrap_or(1);
    if args.threads > cores {
        log::warn!(
            "requested {} threads on a machine with {} logical cores; performance will degrade",
            args.threads,
            cores
        );
    }
    // rayon interprets zero worker threads as "use all cores".
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    run_game_monitoring(
        args.time_units,
        args.max_distance,
        &args.stream,
        &args.metadata,
        args.batch_size as usize,
        args.output.as_deref(),
    )
    .map_err(|e| anyhow::Error::new(e.variant))
}

fn main() {
    env_logger::init();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };
    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
