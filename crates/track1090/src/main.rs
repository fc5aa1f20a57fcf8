#![doc = include_str!("../readme.md")]

mod checkpoint;
mod jsonl_sink;
mod source;

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use modes1090::prelude::*;

use checkpoint::Checkpoint;
use jsonl_sink::JsonlSink;
use source::Source;

const CHECKPOINT_INTERVAL_MESSAGES: u64 = 500;

#[derive(Debug, Parser)]
#[command(
    name = "track1090",
    version,
    author,
    about = "Decode a Beast-framed Mode S stream into a sparse flight track log"
)]
struct Options {
    /// Input source: `-` for stdin, a file path, or `host:port` for a live
    /// Beast TCP feed.
    source: Source,

    /// Where to write the JSONL track log (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Checkpoint file for tracker state and replay cursor. If it exists on
    /// startup, resumes from it.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Emit every reportable change immediately, bypassing the rate limit.
    #[arg(long, default_value = "false")]
    force_reporting: bool,

    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs() as i64
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = Options::parse();

    let filter = if options.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config = Config {
        force_reporting: options.force_reporting,
        ..Config::default()
    };

    let mut last_raw_message_id = 0u64;
    let restored_state = match &options.state {
        Some(path) => checkpoint::load(path)?,
        None => None,
    };

    let output: Box<dyn Write> = match &options.output {
        Some(path) => Box::new(BufWriter::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => Box::new(std::io::stdout()),
    };
    let sink = JsonlSink::new(output);

    let mut tracker = match restored_state {
        Some(checkpoint) => {
            last_raw_message_id = checkpoint.last_raw_message_id;
            tracing::info!(last_raw_message_id, "resuming from checkpoint");
            Tracker::new_with_state(sink, config, &checkpoint.tracker_state)?
        }
        None => Tracker::new(sink, config),
    };

    let input = options.source.open()?;
    let mut reader = BeastReader::new(input);

    loop {
        match reader.next_frame() {
            Ok(Some(raw)) => {
                last_raw_message_id += 1;
                let (icao_id, decoded) = modes1090::decode::decode(&raw.body);
                if !icao_id.is_empty() {
                    tracker.on_message(&icao_id, now_unix(), decoded);
                }
                if last_raw_message_id % CHECKPOINT_INTERVAL_MESSAGES == 0 {
                    save_checkpoint(&options.state, &tracker, last_raw_message_id)?;
                }
            }
            Ok(None) => continue, // unknown type tag: de-framer already resynced
            Err(FramingError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                tracing::error!(error = %e, "beast stream error, stopping");
                break;
            }
        }
    }

    tracker.close_all();
    save_checkpoint(&options.state, &tracker, last_raw_message_id)?;
    Ok(())
}

fn save_checkpoint<S: Sink>(
    path: &Option<PathBuf>,
    tracker: &Tracker<S>,
    last_raw_message_id: u64,
) -> std::io::Result<()> {
    let Some(path) = path else { return Ok(()) };
    let checkpoint = Checkpoint {
        last_raw_message_id,
        tracker_state: tracker.get_state(),
    };
    checkpoint::save(path, &checkpoint)
}
