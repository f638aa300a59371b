//! Radio profile the bridge is driven with.
//!
//! The bridge relays between BLE and a sub-GHz pump radio. Which pump family
//! is on the other side decides the carrier frequency and line encoding the
//! bridge must be configured for.

use serde::{Deserialize, Serialize};

/// Pump family the bridge talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetDevice {
    /// Omnipod Eros pod.
    Omnipod,
    /// Medtronic pump.
    MedtronicPump,
}

/// Carrier frequency band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFrequency {
    /// Omnipod, 433.91 MHz.
    Omnipod,
    /// Medtronic North America, 916.5 MHz.
    MedtronicUs,
    /// Medtronic worldwide, 868.35 MHz.
    MedtronicWorldwide,
}

impl TargetFrequency {
    /// Center frequency in Hz.
    pub fn frequency_hz(self) -> u32 {
        match self {
            Self::Omnipod => 433_910_000,
            Self::MedtronicUs => 916_500_000,
            Self::MedtronicWorldwide => 868_350_000,
        }
    }
}

/// Line encoding applied by the bridge firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Manchester, used by Omnipod.
    Manchester,
    /// 4b6b, used by Medtronic.
    FourBSixB,
}

/// Radio settings for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeProfile {
    pub target: TargetDevice,
    pub frequency: TargetFrequency,
    pub encoding: Encoding,
}

impl BridgeProfile {
    /// Profile for an Omnipod session.
    pub const fn omnipod() -> Self {
        Self {
            target: TargetDevice::Omnipod,
            frequency: TargetFrequency::Omnipod,
            encoding: Encoding::Manchester,
        }
    }

    /// Profile for a Medtronic session in the given band.
    pub const fn medtronic(frequency: TargetFrequency) -> Self {
        Self {
            target: TargetDevice::MedtronicPump,
            frequency,
            encoding: Encoding::FourBSixB,
        }
    }
}

impl Default for BridgeProfile {
    fn default() -> Self {
        Self::omnipod()
    }
}
