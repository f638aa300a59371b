//! Bridge link configuration gate.
//!
//! Verifies the hardware address of the radio bridge a pump session binds
//! to, tracks changes to it, and tells the rest of the system to reconfigure
//! exactly once per change, never while the session is still starting up.

pub mod config;
pub mod gate;
pub mod host;
pub mod settings;
pub mod status_server;

// Re-export commonly used items
pub use config::{BridgeAddress, BridgeProfile, ErrorKind};
pub use gate::{GateSnapshot, LinkConfigGate, Phase, SharedGate, VerifyOutcome};
pub use host::{BroadcastHost, GateEvent, GateHost};
pub use settings::{FileSettings, MemorySettings, SettingsSource};
pub use status_server::{StatusServer, DEFAULT_STATUS_PORT};
