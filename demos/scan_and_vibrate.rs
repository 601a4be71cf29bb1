//! Connects to a local server, scans for devices, and commands the ones
//! it finds.
//!
//! Run against an Intiface server listening on the default insecure
//! WebSocket port:
//!
//! ```bash
//! cargo run --example scan_and_vibrate
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use intiface_client::{Client, ClientDevice, WebsocketConnector};

async fn drive(device: ClientDevice) {
    info!(name = device.name(), "device added");

    if device.allows("VibrateCmd") {
        if let Err(e) = device.send_vibrate_cmd(0.5).await {
            error!(error = %e, "vibrate failed");
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        let _ = device.send_stop_device_cmd().await;
    }

    if device.allows("LinearCmd") {
        let _ = device.send_linear_cmd((1000_u32, 0.9)).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        let _ = device.send_linear_cmd((1000_u32, 0.0)).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let client = Client::new("Rust Example Client");
    client.on_device_added(|device| {
        let device = device.clone();
        tokio::spawn(drive(device));
    });
    client.on_device_removed(|device| {
        info!(name = device.name(), "device removed");
    });
    client.on_scanning_finished(|| info!("scanning finished"));

    let connector = Arc::new(WebsocketConnector::new("ws://127.0.0.1:12345")?);
    client.connect(connector).await?;
    info!(
        server = client.server_name().unwrap_or_default(),
        "connected"
    );

    client.start_scanning().await?;
    tokio::time::sleep(Duration::from_secs(30)).await;
    client.stop_scanning().await?;

    client.disconnect().await?;
    info!("disconnected, quitting");
    Ok(())
}
