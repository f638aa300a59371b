//! HTTP status endpoint for the bridge gate.
//!
//! Serves `GET /status` with the current [`GateSnapshot`] as JSON so the
//! binding can be inspected while the host runs.
//!
//! # Example Response
//!
//! ```json
//! {
//!   "phase": "ready",
//!   "bound_address": "00:11:22:aa:bb:cc",
//!   "pending_change": false,
//!   "last_error": null,
//!   "notifications_sent": 1,
//!   "profile": { "target": "omnipod", "frequency": "omnipod", "encoding": "manchester" }
//! }
//! ```

use crate::gate::{GateSnapshot, SharedGate};
use crate::host::GateHost;
use log::{error, info, warn};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Request, Response, Server};

/// Default port for the status server.
pub const DEFAULT_STATUS_PORT: u16 = 8090;

/// Poll interval for the shutdown flag.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Source of snapshots for the server thread.
type SnapshotFn = Box<dyn Fn() -> GateSnapshot + Send>;

/// HTTP status server.
///
/// Runs in a background thread. Drop it to stop the server.
pub struct StatusServer {
    handle: Option<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    port: u16,
}

impl StatusServer {
    /// Start serving the state of `gate`.
    ///
    /// Pass `None` as `bind_addr` to listen on all interfaces, and port `0`
    /// to let the OS pick one (see [`port`](Self::port)).
    pub fn start<H>(
        bind_addr: Option<IpAddr>,
        port: u16,
        gate: SharedGate<H>,
    ) -> Result<Self, std::io::Error>
    where
        H: GateHost + Send + 'static,
    {
        let addr = match bind_addr {
            Some(ip) => format!("{}:{}", ip, port),
            None => format!("0.0.0.0:{}", port),
        };

        let server = Server::http(&addr)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::AddrInUse, format!("{}", e)))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .unwrap_or(port);

        info!("Status server listening on http://{}/status", addr);

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let snapshot: SnapshotFn = Box::new(move || gate.snapshot());

        let handle = thread::spawn(move || {
            Self::run_server(server, snapshot, shutdown_clone);
        });

        Ok(Self {
            handle: Some(handle),
            shutdown,
            port,
        })
    }

    /// Port the server is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    fn run_server(server: Server, snapshot: SnapshotFn, shutdown: Arc<AtomicBool>) {
        loop {
            if shutdown.load(Ordering::Acquire) {
                info!("Status server shutting down");
                break;
            }

            match server.recv_timeout(RECV_TIMEOUT) {
                Ok(Some(request)) => Self::handle(request, &snapshot),
                Ok(None) => {}
                Err(e) => {
                    error!("Server error: {}", e);
                    break;
                }
            }
        }
    }

    fn handle(request: Request, snapshot: &SnapshotFn) {
        let response = if request.method() != &Method::Get {
            Response::from_string("Method Not Allowed")
                .with_status_code(405)
                .with_header(header("Allow", "GET"))
        } else {
            match request.url() {
                "/status" | "/status/" => match serde_json::to_string(&snapshot()) {
                    Ok(json) => Response::from_string(json)
                        .with_header(header("Content-Type", "application/json"))
                        .with_status_code(200),
                    Err(e) => {
                        error!("Failed to serialize gate snapshot: {}", e);
                        Response::from_string("Internal Server Error").with_status_code(500)
                    }
                },
                "/" => Response::from_string("See /status for bridge gate state")
                    .with_status_code(302)
                    .with_header(header("Location", "/status")),
                _ => Response::from_string("Not Found").with_status_code(404),
            }
        };

        if let Err(e) = request.respond(response) {
            warn!("Failed to send response: {}", e);
        }
    }

    /// Stop the server.
    ///
    /// May take up to one poll interval.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StatusServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header")
}
