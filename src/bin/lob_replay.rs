//! CLI tool for replaying a binary order event feed.
//!
//! Rebuilds one order book per symbol and prints every change of the top
//! `DEPTH` price levels to stdout.
//!
//! # Usage
//!
//! ```bash
//! # Text output, 5 levels per side
//! cargo run --release --bin lob_replay -- data/feed.bin 5
//!
//! # JSON lines, tolerate trades larger than the resting order
//! cargo run --release --bin lob_replay -- data/feed.bin 5 --json --clamp-overfill
//!
//! # Run summary on stderr
//! RUST_LOG=info cargo run --release --bin lob_replay -- data/feed.bin 5 > /dev/null
//! ```

use std::env;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use lob_depth_replay::{
    BookConfig, FileSource, JsonLinesSink, OverfillPolicy, ReplayError, Replayer, Result,
    SnapshotSink, TextSink,
};

/// Command-line arguments
struct Args {
    /// Feed file to replay
    input: PathBuf,
    /// Price levels per side in each snapshot
    depth: usize,
    /// Emit JSON lines instead of text
    json: bool,
    /// Clamp over-filling trades instead of failing
    clamp_overfill: bool,
    /// Suppress per-book warnings
    quiet: bool,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;
    let mut depth: Option<String> = None;
    let mut json = false;
    let mut clamp_overfill = false;
    let mut quiet = false;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--json" | "-j" => {
                json = true;
            }
            "--clamp-overfill" => {
                clamp_overfill = true;
            }
            "--quiet" | "-q" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("Unknown option: {}", flag));
            }
            arg => {
                // Positional arguments
                if input.is_none() {
                    input = Some(PathBuf::from(arg));
                } else if depth.is_none() {
                    depth = Some(arg.to_string());
                } else {
                    return Err(format!("Unexpected argument: {}", arg));
                }
            }
        }
    }

    let input = input.ok_or("Input path is required")?;
    let depth = depth.ok_or("Depth is required")?;
    let depth = depth
        .parse::<usize>()
        .map_err(|_| format!("Depth must be a positive integer, got '{}'", depth))?;

    Ok(Args {
        input,
        depth,
        json,
        clamp_overfill,
        quiet,
    })
}

fn print_help() {
    eprintln!(
        r#"
Order Book Depth Replay

Rebuilds per-symbol order books from a binary order event feed and prints
every change of the top DEPTH price levels.

USAGE:
    lob_replay [OPTIONS] <INPUT> <DEPTH>

ARGS:
    <INPUT>               Feed file (A/U/D/E messages)
    <DEPTH>               Price levels per side, at least 1

OPTIONS:
    -j, --json            Print one JSON object per change
        --clamp-overfill  Fill a trade larger than the order's remaining size
                          completely instead of failing
    -q, --quiet           Do not log per-book warnings
    -h, --help            Print this help message

OUTPUT:
    seq_num, symbol, [(price, volume), ...], [(price, volume), ...]
    Bids best (highest) first, asks best (lowest) first.

Logging goes to stderr and is controlled by RUST_LOG (default: warn).
"#
    );
}

fn build_config(args: &Args) -> Result<BookConfig> {
    let policy = if args.clamp_overfill {
        OverfillPolicy::Clamp
    } else {
        OverfillPolicy::Reject
    };

    Ok(BookConfig::new(args.depth)?
        .with_overfill_policy(policy)
        .with_logging(!args.quiet))
}

fn replay(source: FileSource, config: BookConfig, sink: &mut dyn SnapshotSink) -> Result<()> {
    let mut replayer = Replayer::new(config);
    replayer.run(source, sink)?;
    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    // Parse arguments
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            return ExitCode::from(2);
        }
    };

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    // Open the input before touching any book
    let source = match FileSource::new(&args.input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error opening {}: {}", args.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let writer = BufWriter::new(stdout.lock());

    let result = if args.json {
        replay(source, config, &mut JsonLinesSink::new(writer))
    } else {
        replay(source, config, &mut TextSink::new(writer))
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // Downstream closed the pipe (e.g. `| head`)
        Err(ReplayError::Io(msg)) if msg.contains("Broken pipe") => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
