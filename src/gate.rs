//! Bridge address verification and reconfiguration gate.
//!
//! A [`LinkConfigGate`] lives for one communication session. The host feeds
//! it the configured bridge address whenever configuration is (re-)checked,
//! and the gate decides when the rest of the system must be told that the
//! bridge changed.
//!
//! While the session is still starting up, changes are only recorded. Any
//! number of them collapse into a single notification fired when the host
//! calls [`LinkConfigGate::end_startup_phase`]. Once ready, each change to
//! a different valid address notifies immediately, exactly once.
//!
//! ```text
//!  Starting ──verify(valid, new)──▶ Starting + pending
//!     │                                  │
//!     │ end_startup_phase                │ end_startup_phase ─▶ notify
//!     ▼                                  ▼
//!   Ready ◀──────────────────────────────┘
//!     │
//!     └─verify(valid, new)──▶ notify, stays Ready
//! ```
//!
//! # Example
//!
//! ```
//! use bridge_link_gate::{BroadcastHost, GateEvent, LinkConfigGate};
//!
//! let (host, mut events) = BroadcastHost::new(8);
//! let mut gate = LinkConfigGate::new(host);
//!
//! gate.verify("00:11:22:aa:bb:cc").unwrap();
//! assert!(events.try_recv().is_err()); // deferred during startup
//!
//! assert!(gate.end_startup_phase());
//! assert!(matches!(events.try_recv(), Ok(GateEvent::AddressChanged(_))));
//! ```

use crate::config::{BridgeAddress, BridgeProfile, ErrorKind};
use crate::host::GateHost;
use crate::settings::SettingsSource;
use log::{debug, info};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Session is initializing; notifications are deferred.
    Starting,
    /// Session is operational; notifications fire immediately.
    Ready,
}

/// Result of a successful verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// The candidate passed validation.
    pub accepted: bool,
    /// This pass bound a different address than before.
    pub changed: bool,
}

/// Serializable view of the gate state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateSnapshot {
    /// Current session phase.
    pub phase: Phase,
    /// Bound bridge address, if any pass has succeeded.
    pub bound_address: Option<BridgeAddress>,
    /// A validated change is waiting for the end of startup.
    pub pending_change: bool,
    /// User-facing message for the last failed pass.
    pub last_error: Option<String>,
    /// Change notifications emitted so far.
    pub notifications_sent: u64,
    /// Radio profile of the session.
    pub profile: BridgeProfile,
}

/// Verification and reconfiguration gate for one bridge session.
pub struct LinkConfigGate<H> {
    host: H,
    bound: Option<BridgeAddress>,
    pending_change: bool,
    phase: Phase,
    last_error: Option<ErrorKind>,
    profile: BridgeProfile,
    notifications_sent: u64,
}

impl<H: GateHost> LinkConfigGate<H> {
    /// Create a gate in the startup phase with the Omnipod profile.
    pub fn new(host: H) -> Self {
        Self::with_profile(host, BridgeProfile::omnipod())
    }

    /// Create a gate for a specific radio profile.
    pub fn with_profile(host: H, profile: BridgeProfile) -> Self {
        Self {
            host,
            bound: None,
            pending_change: false,
            phase: Phase::Starting,
            last_error: None,
            profile,
            notifications_sent: 0,
        }
    }

    /// Verify a candidate bridge address.
    ///
    /// On success the address is bound (marking a pending change if it
    /// differs from the current one) and the change is notified unless the
    /// session is still starting. On failure the error is cached in
    /// [`last_error`](Self::last_error), reported to the host, and the
    /// binding is left untouched.
    pub fn verify(&mut self, candidate: &str) -> Result<VerifyOutcome, ErrorKind> {
        self.last_error = None;

        let address = match BridgeAddress::parse(candidate) {
            Ok(address) => address,
            Err(e) => {
                debug!("Bridge address invalid ({}): {:?}", e.as_str(), candidate);
                self.last_error = Some(e);
                self.host.report_configuration_error(e);
                return Err(e);
            }
        };

        let changed = self.bound.as_ref() != Some(&address);
        if changed {
            debug!(
                "Bridge address changed: {:?} -> {}",
                self.bound.as_ref().map(BridgeAddress::as_str),
                address
            );
            self.bound = Some(address);
            self.pending_change = true;
        }

        self.reconcile();

        Ok(VerifyOutcome {
            accepted: true,
            changed,
        })
    }

    /// Read the configured address from `settings` and verify it.
    pub fn verify_from<S>(&mut self, settings: &S) -> Result<VerifyOutcome, ErrorKind>
    where
        S: SettingsSource + ?Sized,
    {
        let candidate = settings.bridge_address();
        self.verify(&candidate)
    }

    /// Leave the startup phase and flush any deferred change.
    ///
    /// Only the first call changes the phase; later calls repeat the
    /// reconcile step, which is a no-op once nothing is pending. Returns
    /// `true` when no unnotified change remains.
    pub fn end_startup_phase(&mut self) -> bool {
        if self.phase == Phase::Starting {
            info!("Bridge session leaving startup phase");
            self.phase = Phase::Ready;
        }
        self.reconcile();
        !self.pending_change
    }

    /// Notify a pending change if the session is ready.
    fn reconcile(&mut self) {
        match self.phase {
            Phase::Starting => {}
            Phase::Ready => {
                if !self.pending_change {
                    return;
                }
                if let Some(address) = &self.bound {
                    info!("Bridge address set to {}, requesting reconfiguration", address);
                    self.host.emit_change_notification(address);
                    self.notifications_sent += 1;
                }
                self.pending_change = false;
            }
        }
    }

    /// Switch the radio profile for the rest of the session.
    ///
    /// Does not touch the binding and does not notify.
    pub fn set_profile(&mut self, profile: BridgeProfile) {
        if self.profile != profile {
            debug!("Bridge profile set to {:?}", profile);
        }
        self.profile = profile;
    }

    /// Currently bound address, if any pass has succeeded.
    pub fn bound_address(&self) -> Option<&BridgeAddress> {
        self.bound.as_ref()
    }

    /// A validated change has not been notified yet.
    pub fn has_pending_change(&self) -> bool {
        self.pending_change
    }

    /// Current session phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Startup phase has ended.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Error from the most recent pass, if it failed.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// User-facing message for [`last_error`](Self::last_error).
    pub fn error_description(&self) -> Option<String> {
        self.last_error.map(|e| e.to_string())
    }

    /// Radio profile of the session.
    pub fn profile(&self) -> BridgeProfile {
        self.profile
    }

    /// Number of change notifications emitted so far.
    pub fn notifications_sent(&self) -> u64 {
        self.notifications_sent
    }

    /// The injected host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Capture the current state for reporting.
    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            phase: self.phase,
            bound_address: self.bound.clone(),
            pending_change: self.pending_change,
            last_error: self.error_description(),
            notifications_sent: self.notifications_sent,
            profile: self.profile,
        }
    }
}

/// A gate shared between threads.
///
/// Every operation holds the lock for its whole verify-then-reconcile
/// sequence, so concurrent callers cannot lose or duplicate a notification.
pub struct SharedGate<H> {
    inner: Arc<Mutex<LinkConfigGate<H>>>,
}

impl<H> Clone for SharedGate<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: GateHost> SharedGate<H> {
    /// Wrap a gate for shared use.
    pub fn new(gate: LinkConfigGate<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(gate)),
        }
    }

    // A panic inside a host callback happens after the gate's own fields
    // are consistent, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, LinkConfigGate<H>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// See [`LinkConfigGate::verify`].
    pub fn verify(&self, candidate: &str) -> Result<VerifyOutcome, ErrorKind> {
        self.lock().verify(candidate)
    }

    /// See [`LinkConfigGate::verify_from`].
    pub fn verify_from<S>(&self, settings: &S) -> Result<VerifyOutcome, ErrorKind>
    where
        S: SettingsSource + ?Sized,
    {
        // Read settings before locking so slow storage does not block readers
        let candidate = settings.bridge_address();
        self.lock().verify(&candidate)
    }

    /// See [`LinkConfigGate::end_startup_phase`].
    pub fn end_startup_phase(&self) -> bool {
        self.lock().end_startup_phase()
    }

    /// See [`LinkConfigGate::snapshot`].
    pub fn snapshot(&self) -> GateSnapshot {
        self.lock().snapshot()
    }

    /// Run `f` with exclusive access to the gate.
    pub fn with<R>(&self, f: impl FnOnce(&mut LinkConfigGate<H>) -> R) -> R {
        f(&mut self.lock())
    }
}
