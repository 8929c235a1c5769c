//! Kind-specific request parameters carried by ledger events.
//!
//! Field names serialize in the driver's camelCase spelling so that action
//! scripts recorded from the adapter can be replayed as-is.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::ParseError, hex};

/// GAP connection parameters, in milliseconds where applicable.
///
/// Intervals step in 1.25 ms units on the air, so they are kept fractional.
/// Missing fields read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionParameters {
    /// Lower bound of the connection interval (ms).
    pub min_connection_interval: f64,
    /// Upper bound of the connection interval (ms).
    pub max_connection_interval: f64,
    /// Supervision timeout (ms).
    pub connection_supervision_timeout: u16,
    /// Number of connection events the peripheral may skip.
    #[serde(alias = "slaveLatency")]
    pub peripheral_latency: u16,
}

impl ConnectionParameters {
    /// Parameters with a single forced interval, as the editor submits them.
    pub fn with_fixed_interval(
        interval: f64,
        peripheral_latency: u16,
        connection_supervision_timeout: u16,
    ) -> Self {
        Self {
            min_connection_interval: interval,
            max_connection_interval: interval,
            connection_supervision_timeout,
            peripheral_latency,
        }
    }
}

/// PHY mode on one direction of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phy {
    /// Let the controller pick.
    #[default]
    #[serde(rename = "BLE_GAP_PHY_AUTO")]
    Auto,
    /// 1 Mbps.
    #[serde(rename = "BLE_GAP_PHY_1MBPS")]
    OneMbps,
    /// 2 Mbps.
    #[serde(rename = "BLE_GAP_PHY_2MBPS")]
    TwoMbps,
    /// Coded (long range).
    #[serde(rename = "BLE_GAP_PHY_CODED")]
    Coded,
}

impl Phy {
    /// Driver spelling of this PHY.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "BLE_GAP_PHY_AUTO",
            Self::OneMbps => "BLE_GAP_PHY_1MBPS",
            Self::TwoMbps => "BLE_GAP_PHY_2MBPS",
            Self::Coded => "BLE_GAP_PHY_CODED",
        }
    }
}

impl fmt::Display for Phy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BLE_GAP_PHY_AUTO" => Ok(Self::Auto),
            "BLE_GAP_PHY_1MBPS" => Ok(Self::OneMbps),
            "BLE_GAP_PHY_2MBPS" => Ok(Self::TwoMbps),
            "BLE_GAP_PHY_CODED" => Ok(Self::Coded),
            other => Err(ParseError::UnknownPhy(other.to_owned())),
        }
    }
}

/// Requested transmit and receive PHY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhyParameters {
    /// Transmit PHY.
    #[serde(alias = "tx_phys")]
    pub tx_phy: Phy,
    /// Receive PHY.
    #[serde(alias = "rx_phys")]
    pub rx_phy: Phy,
}

/// Local I/O capabilities advertised during pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IoCapabilities {
    /// Display only.
    #[serde(rename = "BLE_GAP_IO_CAPS_DISPLAY_ONLY")]
    DisplayOnly,
    /// Display with yes/no input.
    #[serde(rename = "BLE_GAP_IO_CAPS_DISPLAY_YESNO")]
    DisplayYesNo,
    /// Keyboard only.
    #[serde(rename = "BLE_GAP_IO_CAPS_KEYBOARD_ONLY")]
    KeyboardOnly,
    /// No input, no output.
    #[default]
    #[serde(rename = "BLE_GAP_IO_CAPS_NONE")]
    NoInputNoOutput,
    /// Keyboard and display.
    #[serde(rename = "BLE_GAP_IO_CAPS_KEYBOARD_DISPLAY")]
    KeyboardDisplay,
}

impl FromStr for IoCapabilities {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BLE_GAP_IO_CAPS_DISPLAY_ONLY" => Ok(Self::DisplayOnly),
            "BLE_GAP_IO_CAPS_DISPLAY_YESNO" => Ok(Self::DisplayYesNo),
            "BLE_GAP_IO_CAPS_KEYBOARD_ONLY" => Ok(Self::KeyboardOnly),
            "BLE_GAP_IO_CAPS_NONE" => Ok(Self::NoInputNoOutput),
            "BLE_GAP_IO_CAPS_KEYBOARD_DISPLAY" => Ok(Self::KeyboardDisplay),
            other => Err(ParseError::UnknownIoCapabilities(other.to_owned())),
        }
    }
}

/// Pairing (security) parameters, as requested by the peer or proposed by
/// the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityParameters {
    /// Create a bond.
    pub bond: bool,
    /// Require man-in-the-middle protection.
    pub mitm: bool,
    /// Use LE Secure Connections.
    pub lesc: bool,
    /// Exchange keypress notifications during passkey entry.
    pub keypress: bool,
    /// Local I/O capabilities.
    pub io_caps: IoCapabilities,
    /// Out-of-band data is available.
    pub oob: bool,
    /// Smallest acceptable encryption key size, in octets.
    pub min_key_size: u8,
    /// Largest acceptable encryption key size, in octets.
    pub max_key_size: u8,
}

impl Default for SecurityParameters {
    fn default() -> Self {
        Self {
            bond: false,
            mitm: false,
            lesc: false,
            keypress: false,
            io_caps: IoCapabilities::NoInputNoOutput,
            oob: false,
            min_key_size: 7,
            max_key_size: 16,
        }
    }
}

/// Authentication key shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthKeyParameters {
    /// Six-digit passkey (or comparison value) as reported by the driver.
    pub passkey: String,
}

/// Our own LE Secure Connections out-of-band data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LescOobData {
    /// Address the OOB data was generated for.
    pub address: String,
    /// Random value `r`.
    pub random: Vec<u8>,
    /// Confirm value `c`.
    pub confirm: Vec<u8>,
}

impl LescOobData {
    /// OOB data typed in by the operator as hex digits.
    pub fn from_hex(
        address: impl Into<String>,
        random: &str,
        confirm: &str,
    ) -> Result<Self, ParseError> {
        let parse = |digits: &str| {
            hex::hex_string_to_bytes(digits)
                .ok_or_else(|| ParseError::InvalidHex(digits.to_owned()))
        };
        Ok(Self { address: address.into(), random: parse(random)?, confirm: parse(confirm)? })
    }

    /// Random value as dash-separated hex, for display.
    pub fn random_hex(&self) -> String {
        hex::to_hex_string(&self.random)
    }

    /// Confirm value as dash-separated hex, for display.
    pub fn confirm_hex(&self) -> String {
        hex::to_hex_string(&self.confirm)
    }
}
