//! Host process for the bridge gate.
//!
//! Reads the bridge address from the settings file, runs the startup
//! verification pass, then keeps re-verifying so edits to the file are
//! picked up. Provides:
//! - Change and error events logged from the gate's bus
//! - HTTP status endpoint at http://localhost:8090/status
//!
//! # Usage
//!
//! ```bash
//! BRIDGE_GATE_SETTINGS=./settings.json cargo run --bin gate-host
//! ```

use bridge_link_gate::{
    BroadcastHost, FileSettings, GateEvent, LinkConfigGate, SharedGate, StatusServer,
    DEFAULT_STATUS_PORT,
};
use log::{error, info, warn};
use std::thread;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// Interval between verification passes.
const VERIFY_INTERVAL: Duration = Duration::from_secs(10);

/// Environment variable overriding the settings file path.
const SETTINGS_ENV: &str = "BRIDGE_GATE_SETTINGS";

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== Bridge gate host starting ===");

    let settings = match std::env::var(SETTINGS_ENV) {
        Ok(path) => FileSettings::new(path),
        Err(_) => match FileSettings::open_default() {
            Ok(s) => s,
            Err(e) => {
                error!("Cannot locate settings file: {}", e);
                std::process::exit(1);
            }
        },
    };
    info!("Reading bridge address from {:?}", settings.path());

    let (host, mut events) = BroadcastHost::new(bridge_link_gate::host::DEFAULT_EVENT_CAPACITY);
    let gate = SharedGate::new(LinkConfigGate::new(host));

    // Log bus events from a listener thread
    let _listener = thread::spawn(move || loop {
        match events.blocking_recv() {
            Ok(GateEvent::AddressChanged(address)) => {
                info!("Bridge reconfiguration requested for {}", address)
            }
            Ok(GateEvent::ConfigurationError(e)) => warn!("Bridge configuration error: {}", e),
            Err(RecvError::Lagged(n)) => warn!("Event listener lagged, {} events lost", n),
            Err(RecvError::Closed) => break,
        }
    });

    // Startup verification pass
    match gate.verify_from(&settings) {
        Ok(_) => info!("Bridge address accepted"),
        Err(e) => warn!("{}", e),
    }

    // Keep server alive - variable intentionally unused except for Drop
    let _status_server = match StatusServer::start(None, DEFAULT_STATUS_PORT, gate.clone()) {
        Ok(server) => {
            info!(
                "Status server running at http://localhost:{}/status",
                server.port()
            );
            Some(server)
        }
        Err(e) => {
            warn!("Failed to start status server: {}", e);
            warn!("Continuing without status server");
            None
        }
    };

    if !gate.end_startup_phase() {
        warn!("Bridge change still pending after startup");
    }

    info!("Entering verification loop (Ctrl+C to exit)...");

    loop {
        thread::sleep(VERIFY_INTERVAL);
        if let Ok(outcome) = gate.verify_from(&settings) {
            if outcome.changed {
                info!("Bridge address changed on disk");
            }
        }
    }
}
