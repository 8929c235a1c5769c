//! Ledger configuration.

use serde::{Deserialize, Serialize};

/// Largest LL data length (octets) the SoftDevice supports.
pub const MAX_DATA_LENGTH: u16 = 251;

/// Tunables for [`crate::EventLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Data length proposed by a user-initiated data length update that does
    /// not name one.
    pub default_data_length: u16,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { default_data_length: MAX_DATA_LENGTH }
    }
}
