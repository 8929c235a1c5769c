//! Snapshots of adapter-reported remote devices.
//!
//! The ledger never owns device state. Each event stores a [`Device`] copied
//! at creation time, and sweeps correlate events to devices by
//! [`Device::instance_id`] only.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::ParseError,
    params::{ConnectionParameters, Phy},
};

/// Default ATT MTU before any exchange.
pub const DEFAULT_ATT_MTU: u16 = 23;

/// GAP role of the remote device on this link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Remote is the central, we are the peripheral.
    Central,
    /// Remote is the peripheral, we are the central.
    Peripheral,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Central => f.write_str("central"),
            Self::Peripheral => f.write_str("peripheral"),
        }
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "central" => Ok(Self::Central),
            "peripheral" => Ok(Self::Peripheral),
            other => Err(ParseError::UnknownRole(other.to_owned())),
        }
    }
}

/// Snapshot of a connected remote device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Stable identifier assigned by the adapter layer.
    pub instance_id: String,
    /// Bluetooth address, for display.
    #[serde(default)]
    pub address: String,
    /// GAP role of the remote. `None` while the adapter has not reported it.
    #[serde(default)]
    pub role: Option<Role>,
    /// Preferred (or current) connection parameters.
    #[serde(flatten)]
    pub connection_parameters: ConnectionParameters,
    /// Current transmit PHY.
    #[serde(default)]
    pub tx_phy: Phy,
    /// Current receive PHY.
    #[serde(default)]
    pub rx_phy: Phy,
    /// Current ATT MTU.
    #[serde(default = "default_mtu")]
    pub mtu: u16,
}

fn default_mtu() -> u16 {
    DEFAULT_ATT_MTU
}

impl Device {
    /// Device with the given instance id and defaults for everything else.
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            address: String::new(),
            role: None,
            connection_parameters: ConnectionParameters::default(),
            tx_phy: Phy::Auto,
            rx_phy: Phy::Auto,
            mtu: DEFAULT_ATT_MTU,
        }
    }

    /// Set the GAP role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the display address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the preferred connection parameters.
    #[must_use]
    pub fn with_connection_parameters(mut self, params: ConnectionParameters) -> Self {
        self.connection_parameters = params;
        self
    }

    /// Whether the remote is the central of the link.
    pub fn is_central(&self) -> bool {
        self.role == Some(Role::Central)
    }

    /// Whether `other` refers to the same remote device.
    pub fn same_device(&self, other: &Device) -> bool {
        self.instance_id == other.instance_id
    }
}
