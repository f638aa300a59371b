//! Bridge configuration types.
//!
//! # Components
//!
//! - [`address`] - Bridge hardware address and its shape check
//! - [`profile`] - Target device, frequency and encoding for a session
//! - [`error`] - Verification error kinds

mod address;
mod error;
mod profile;

pub use address::{is_valid_shape, BridgeAddress};
pub use error::ErrorKind;
pub use profile::{BridgeProfile, Encoding, TargetDevice, TargetFrequency};
