//! glance sender — entry point.
//!
//! ```text
//! glance-sender 192.168.1.50                  Stream with defaults
//! glance-sender 192.168.1.50 --fps 30         Override the frame rate
//! glance-sender 192.168.1.50 --width 1920 --height 1080
//! ```
//!
//! Captures the primary display and streams it to a glance receiver
//! until Enter is pressed, Ctrl-C arrives, or the connection drops.

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use glance_core::stream::{ScreenGrabber, SenderConfig, StreamSender};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "glance-sender", about = "Stream the local screen to a glance receiver")]
struct Cli {
    /// Receiver host or IP address.
    receiver: String,

    /// Receiver port.
    #[arg(short, long, default_value_t = 9999)]
    port: u16,

    /// Frames per second.
    #[arg(long, default_value_t = 24)]
    fps: u32,

    /// Outgoing frame width.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Outgoing frame height.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 80)]
    quality: u8,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = SenderConfig::new(cli.receiver, cli.port);
    config.fps = cli.fps;
    config.width = cli.width;
    config.height = cli.height;
    config.quality = cli.quality;
    config.validate()?;

    info!("glance-sender v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "streaming to {}:{} at {}x{} @{}fps",
        config.host, config.port, config.width, config.height, config.fps
    );

    let source = ScreenGrabber::new()?;
    let sender = StreamSender::new(config, source);
    let session = sender.session();
    let mut pipeline = tokio::spawn(sender.run());

    println!("Press Enter to stop...");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tokio::select! {
        _ = lines.next_line() => info!("console stop requested"),
        _ = tokio::signal::ctrl_c() => info!("Ctrl-C received, shutting down"),
        res = &mut pipeline => {
            // The pipeline ended on its own: connect failure or a
            // fatal mid-stream error.
            match res? {
                Ok(()) => info!("stream ended"),
                Err(e) => error!("stream failed: {e}"),
            }
            return Ok(());
        }
    }

    session.stop();
    match pipeline.await? {
        Ok(()) => info!("stopped"),
        Err(e) => error!("stream failed: {e}"),
    }
    Ok(())
}
