//! Capabilities the gate needs from its host.
//!
//! The gate never talks to the rest of the system directly. It calls the
//! two methods of [`GateHost`], and the host decides how to deliver them.
//! [`BroadcastHost`] is the standard implementation: it publishes
//! [`GateEvent`]s on a tokio broadcast channel so any number of listeners
//! (pump driver, UI, status log) can react.

use crate::config::{BridgeAddress, ErrorKind};
use log::debug;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

/// Side effects the gate can request from its host.
///
/// Both calls are fire-and-forget and must not block.
pub trait GateHost {
    /// The bound bridge address changed and dependents should reconnect.
    fn emit_change_notification(&self, address: &BridgeAddress);

    /// A verification pass rejected the configured address.
    fn report_configuration_error(&self, error: ErrorKind);
}

impl<T: GateHost + ?Sized> GateHost for Arc<T> {
    fn emit_change_notification(&self, address: &BridgeAddress) {
        (**self).emit_change_notification(address)
    }

    fn report_configuration_error(&self, error: ErrorKind) {
        (**self).report_configuration_error(error)
    }
}

/// Event published on the gate's bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// A new bridge address is bound.
    AddressChanged(BridgeAddress),
    /// The configured address was rejected.
    ConfigurationError(ErrorKind),
}

/// [`GateHost`] that publishes on a broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastHost {
    tx: broadcast::Sender<GateEvent>,
}

impl BroadcastHost {
    /// Create a host and its first subscriber.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<GateEvent>) {
        let (tx, rx) = broadcast::channel(capacity);
        (Self { tx }, rx)
    }

    /// Subscribe another listener. It sees only events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.tx.subscribe()
    }

    fn publish(&self, event: GateEvent) {
        // Sending only fails when nobody listens, which is fine.
        if let Err(broadcast::error::SendError(event)) = self.tx.send(event) {
            debug!("No subscribers for gate event {:?}", event);
        }
    }
}

impl Default for BroadcastHost {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY).0
    }
}

impl GateHost for BroadcastHost {
    fn emit_change_notification(&self, address: &BridgeAddress) {
        self.publish(GateEvent::AddressChanged(address.clone()));
    }

    fn report_configuration_error(&self, error: ErrorKind) {
        self.publish(GateEvent::ConfigurationError(error));
    }
}
