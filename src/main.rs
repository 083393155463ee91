use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::TypedValueParser;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ccplot::formatter::{PanelFormatter, TextPanelFormatter};
use ccplot::layout::{GridConfig, GridLayout, DEFAULT_COLS};

/// Plot MIDI CC values over time
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(help = "Path to the MIDI file")]
    midi_file: PathBuf,

    #[arg(
        long,
        default_value_t = DEFAULT_COLS,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from),
        help = "Number of columns in the subplot grid"
    )]
    cols: usize,

    #[arg(
        long,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from),
        help = "Number of rows in the subplot grid (default: enough for every CC)"
    )]
    rows: Option<usize>,

    #[arg(long, default_value_t = 48, help = "Width of each sparkline in characters")]
    width: usize,

    #[arg(short, long, help = "Log tempo changes and other file details")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let extraction = ccplot::extract_file(&args.midi_file)
        .with_context(|| format!("load midi file {}", args.midi_file.display()))?;

    if extraction.timeline.is_empty() {
        println!("No control change data in {}", args.midi_file.display());
        return Ok(());
    }

    let config = GridConfig {
        cols: args.cols,
        rows: args.rows,
    };
    let layout = GridLayout::compute(&extraction, &config);
    let formatter = TextPanelFormatter::new(args.width);

    println!("{}", layout.title);
    println!(
        "{} x {} grid, {:.3}s",
        layout.rows,
        layout.cols,
        extraction.timeline.duration()
    );

    for row in 0..layout.rows {
        for panel in layout.row(row) {
            let points = extraction
                .timeline
                .series(panel.channel, panel.controller)
                .unwrap_or_default();
            println!();
            println!("({}, {}) {}", row + 1, panel.col + 1, formatter.format(panel, points));
        }
    }

    Ok(())
}
