//! dstar-recorder – record a reflector stream to a `.dvtool` file

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use dstar_cli::ReflectorConnection;
use dstar_reflector::{select_protocol, ReflectorKind};
use dstar_wire::{Callsign, Module};

/// Connects to a D-STAR reflector and records every stream it relays.
#[derive(Parser)]
struct Args {
    /// Your station callsign
    callsign: String,
    /// Reflector callsign, e.g. XRF757
    reflector: String,
    /// Reflector module, e.g. C
    module: String,
    /// Reflector hostname or IP address
    host: String,
    /// Directory to write recorded `<stream_id>.dvtool` files into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
    /// Force a specific reflector protocol instead of inferring it
    #[arg(short, long, value_parser = parse_protocol)]
    protocol: Option<ReflectorKind>,
}

fn parse_protocol(s: &str) -> Result<ReflectorKind, String> {
    ReflectorKind::parse(s).ok_or_else(|| format!("unknown protocol \"{s}\""))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dstar_observability::init(args.verbose);

    let my_callsign = Callsign::new(&args.callsign)?;
    let reflector = Callsign::new(&args.reflector)?;
    let module = Module::new(&args.module)?;
    let host: IpAddr = resolve_host(&args.host)?;

    let kind = select_protocol(&reflector, args.protocol);
    let conn = ReflectorConnection::connect(kind, my_callsign, host, module).await?;

    tracing::info!(reflector = %args.reflector, host = %args.host, "recording started, Ctrl-C to stop");
    tokio::select! {
        result = dstar_cli::recorder::run(conn, &args.out_dir) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, closing recorder");
        }
    }

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
