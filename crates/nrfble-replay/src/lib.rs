//! Replay of recorded ledger actions.
//!
//! A script is a JSON array of [`LedgerAction`]s in their driver spelling
//! (`{"type": "DEVICE_MTU_UPDATE_REQUEST", ...}`). Replaying applies them in
//! order to a fresh [`EventLedger`] and reports the final state.
//!
//! # Usage
//!
//! ```ignore
//! let actions = load_script(Path::new("session.json"))?;
//! let report = replay(actions, &ReplayConfig::default())?;
//! println!("{}", serde_json::to_string_pretty(&report.ledger)?);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;

use std::{fs, path::Path};

pub use error::ReplayError;
use nrfble_events::{BleEvent, EventLedger, EventStatus, LedgerAction, LedgerConfig};
use nrfble_harness::{InvariantRegistry, LedgerSnapshot};
use serde::Serialize;

/// Replay settings.
#[derive(Debug, Clone, Default)]
pub struct ReplayConfig {
    /// Configuration of the replayed ledger.
    pub ledger: LedgerConfig,
    /// Check the standard invariants after every action.
    pub check_invariants: bool,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    /// Ledger after the last action.
    pub ledger: EventLedger,
    /// Number of actions applied.
    pub steps: usize,
    /// Number of actions that changed the ledger.
    pub changes: usize,
}

impl ReplayReport {
    /// Final events with the given status, in id order.
    pub fn events_with_status(&self, status: EventStatus) -> Vec<&BleEvent> {
        self.ledger.events().filter(|event| event.status == status).collect()
    }
}

/// Decode a script from JSON text.
pub fn parse_script(json: &str) -> Result<Vec<LedgerAction>, ReplayError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and decode a script file.
pub fn load_script(path: &Path) -> Result<Vec<LedgerAction>, ReplayError> {
    let json = fs::read_to_string(path)
        .map_err(|source| ReplayError::Io { path: path.to_path_buf(), source })?;
    parse_script(&json)
}

/// Apply `actions` to a fresh ledger.
///
/// With invariant checks enabled, the first violation aborts the replay and
/// reports the offending step (0-based).
pub fn replay(
    actions: Vec<LedgerAction>,
    config: &ReplayConfig,
) -> Result<ReplayReport, ReplayError> {
    let mut ledger = EventLedger::new(config.ledger);
    let invariants = InvariantRegistry::standard();
    let mut snapshot = LedgerSnapshot::from_ledger(&ledger);
    let mut steps = 0;
    let mut changes = 0;

    for (step, action) in actions.into_iter().enumerate() {
        let cleared = matches!(action, LedgerAction::ClearAllEvents);
        let effect = ledger.handle(action);
        tracing::debug!(step, ?effect, "applied");

        steps += 1;
        if effect.is_change() {
            changes += 1;
        }

        if config.check_invariants {
            snapshot.observe(&ledger, cleared);
            if let Err(violations) = invariants.check_all(&snapshot) {
                let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
                return Err(ReplayError::Invariant { step, violations: messages.join("; ") });
            }
        }
    }

    tracing::info!(steps, changes, events = ledger.len(), "replay finished");
    Ok(ReplayReport { ledger, steps, changes })
}
