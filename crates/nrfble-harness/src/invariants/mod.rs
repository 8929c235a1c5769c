//! Invariant checking for the event ledger.
//!
//! Invariants are properties that must always hold while the ledger runs.
//! Unlike example-based tests that check specific scenarios, invariants
//! verify behavioral properties across all possible action sequences.
//!
//! # Architecture
//!
//! Observable ledger state is extracted into a [`LedgerSnapshot`], then
//! registered [`Invariant`] checks run against it. The snapshot also carries
//! the history of the id counter, so ordering properties can be checked.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let mut snapshot = LedgerSnapshot::default();
//! snapshot.observe(&ledger, cleared);
//! registry.check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

use std::fmt;

pub use checks::{
    ClearedLedgerEmpty, CounterMonotonicity, IdsBelowCounter, NoUnknownStatus,
    ReceivedKeypressOnDisplay,
};
pub use snapshot::{CounterObservation, EventSnapshot, LedgerSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Identifies an invariant in violation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantKind {
    /// Every event id is below the next id to allocate.
    IdsBelowCounter,
    /// No stored event carries the unassigned status.
    NoUnknownStatus,
    /// The id counter only moves backwards on clear.
    CounterMonotonicity,
    /// A clear leaves nothing behind.
    ClearedLedgerEmpty,
    /// Received keypress flags only appear on passkey display events.
    ReceivedKeypressOnDisplay,
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IdsBelowCounter => "ids_below_counter",
            Self::NoUnknownStatus => "no_unknown_status",
            Self::CounterMonotonicity => "counter_monotonicity",
            Self::ClearedLedgerEmpty => "cleared_ledger_empty",
            Self::ReceivedKeypressOnDisplay => "received_keypress_on_display",
        };
        f.write_str(name)
    }
}

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Violated invariant.
    pub invariant: InvariantKind,
    /// Description of what went wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against ledger state.
pub trait Invariant: Send + Sync {
    /// Invariant identity for error reporting.
    fn kind(&self) -> InvariantKind;

    /// Check the invariant against the current state.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &LedgerSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
///
/// Use [`InvariantRegistry::standard()`] for the ledger invariants.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard ledger invariants.
    ///
    /// Includes:
    /// - [`IdsBelowCounter`]: every id was handed out by the counter
    /// - [`NoUnknownStatus`]: stored events always have a real status
    /// - [`CounterMonotonicity`]: the counter only restarts on clear
    /// - [`ClearedLedgerEmpty`]: clear drops events and selection
    /// - [`ReceivedKeypressOnDisplay`]: peer keypresses land on displays
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(IdsBelowCounter);
        registry.add(NoUnknownStatus);
        registry.add(CounterMonotonicity);
        registry.add(ClearedLedgerEmpty);
        registry.add(ReceivedKeypressOnDisplay);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &LedgerSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() {
            Ok(())
        } else {
            for violation in &violations {
                tracing::warn!(invariant = %violation.invariant, "{}", violation.message);
            }
            Err(violations)
        }
    }

    /// Check all invariants, panicking on the first failure.
    ///
    /// Use this in tests where you want immediate failure with context.
    pub fn assert_all(&self, state: &LedgerSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
