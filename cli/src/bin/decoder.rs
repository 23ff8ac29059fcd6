//! dstar-decoder – decode a `.dvtool` stream into a WAV recording

use std::path::PathBuf;

use clap::Parser;

/// Decodes a D-STAR `.dvtool` stream into a mono 16-bit 8kHz WAV file.
#[derive(Parser)]
struct Args {
    /// Source `.dvtool` file
    input: PathBuf,
    /// Destination WAV file
    output: PathBuf,
    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dstar_observability::init(args.verbose);

    dstar_cli::decoder::run(&args.input, &args.output)?;
    tracing::info!(output = %args.output.display(), "decoding complete");
    Ok(())
}
