//! dstar-transcoder-cli – transcode a recorded `.dvtool` stream via AMBEd

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use dstar_wire::Callsign;

/// Sends a recorded stream through an AMBEd transcoder and writes the
/// result back out under the matching output codec.
#[derive(Parser)]
struct Args {
    /// Your station callsign
    callsign: String,
    /// AMBEd host
    host: String,
    /// Source `.dvtool` file
    input: PathBuf,
    /// Destination `.dvtool` file
    output: PathBuf,
    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dstar_observability::init(args.verbose);

    let my_callsign = Callsign::new(&args.callsign)?;
    let host = resolve_host(&args.host)?;

    dstar_cli::transcoder::run(my_callsign, host, &args.input, &args.output).await?;
    tracing::info!(output = %args.output.display(), "transcoding complete");
    Ok(())
}

fn resolve_host(host: &str) -> anyhow::Result<IpAddr> {
    use std::net::ToSocketAddrs;
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    (host, 0u16)
        .to_socket_addrs()?
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| anyhow::anyhow!("could not resolve host \"{host}\""))
}
