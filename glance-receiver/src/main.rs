//! glance receiver — entry point.
//!
//! ```text
//! glance-receiver                       Listen on 0.0.0.0:9999
//! glance-receiver --port 7000           Custom port
//! glance-receiver --graphics sixel      Force a terminal graphics protocol
//! ```
//!
//! Renders incoming frames in the terminal. Press `q` or `Esc` in the
//! viewer (or Ctrl-C) to stop; a sender disconnect just returns the
//! receiver to waiting for the next connection.

mod viewer;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use glance_core::stream::{ReceiverConfig, StreamReceiver};
use viewer::TerminalViewer;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "glance-receiver", about = "Receive and display a glance screen stream")]
struct Cli {
    /// Address to bind (all interfaces by default).
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = 9999)]
    port: u16,

    /// Force a graphics protocol: sixel, kitty, iterm2, halfblocks.
    #[arg(long)]
    graphics: Option<String>,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The viewer owns stdout once raw mode is on; logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ReceiverConfig::new(cli.host, cli.port);
    // Validate before the terminal is put into raw mode so a bad
    // address fails with a readable message.
    config.validate()?;

    info!("glance-receiver v{}", env!("CARGO_PKG_VERSION"));
    info!("listening on {}:{}", config.host, config.port);
    info!("press q or Esc in the viewer to stop");

    let viewer = TerminalViewer::new(cli.graphics.as_deref())?;
    let receiver = StreamReceiver::new(config, viewer);
    let session = receiver.session();
    let mut pipeline = tokio::spawn(receiver.run());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            session.stop();
        }
        res = &mut pipeline => {
            match res? {
                Ok(()) => info!("receiver stopped"),
                Err(e) => error!("receiver failed: {e}"),
            }
            return Ok(());
        }
    }

    match pipeline.await? {
        Ok(()) => info!("stopped"),
        Err(e) => error!("receiver failed: {e}"),
    }
    Ok(())
}
