//! dstar-encoder – encode a WAV recording into a `.dvtool` stream

use std::path::PathBuf;

use clap::Parser;
use dstar_cli::encoder::Codec2Mode;

/// Encodes a mono 16-bit 8kHz WAV file into a D-STAR `.dvtool` stream.
#[derive(Parser)]
struct Args {
    /// Source WAV file (1 channel, 16 bits/sample, 8000 samples/sec)
    input: PathBuf,
    /// Destination `.dvtool` file
    output: PathBuf,
    /// Codec2 bitrate
    #[arg(short, long, default_value = "3200", value_parser = parse_mode)]
    mode: Codec2Mode,
    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_mode(s: &str) -> Result<Codec2Mode, String> {
    Codec2Mode::parse(s).ok_or_else(|| format!("unknown mode \"{s}\", expected 3200 or 2400"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dstar_observability::init(args.verbose);

    dstar_cli::encoder::run(&args.input, &args.output, args.mode)?;
    tracing::info!(output = %args.output.display(), "encoding complete");
    Ok(())
}
