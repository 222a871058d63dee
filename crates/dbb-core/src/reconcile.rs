//! Reconciliation of discovered change scripts against the ledger.
//!
//! Given the sorted filesystem scripts and what the ledger says about the
//! schema, decide which scripts are pending.

use crate::script::ChangeScript;

/// What the ledger reported for a schema.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Most recently applied script (highest order), if any.
    pub latest: Option<ChangeScript>,
    /// Whether the forced-rebuild marker row is present.
    pub forced_rebuild: bool,
}

/// Outcome state of reconciling one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerState {
    /// Empty ledger on a non-test identity: the schema is not under migration control.
    Empty,
    /// Test identity: the schema is rebuilt from scratch, so everything is pending.
    Fresh,
    /// Forced-rebuild marker present: everything is pending.
    ForcedRebuild,
    /// Latest ledger entry found at `position` in the filesystem list.
    InSync { position: usize },
    /// Latest ledger entry is missing from the filesystem: the database is ahead.
    Drifted { latest: ChangeScript },
}

impl std::fmt::Display for LedgerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerState::Empty => write!(f, "empty"),
            LedgerState::Fresh => write!(f, "fresh"),
            LedgerState::ForcedRebuild => write!(f, "forced-rebuild"),
            LedgerState::InSync { .. } => write!(f, "in-sync"),
            LedgerState::Drifted { .. } => write!(f, "drifted"),
        }
    }
}

/// Result of reconciliation: the state and the scripts still to apply.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub state: LedgerState,
    pub pending: Vec<ChangeScript>,
}

/// Compute the pending subset of `scripts` (sorted ascending by order).
///
/// `test_identity` marks a disposable test schema. It is rebuilt from scratch
/// on every run, provided its ledger has not drifted ahead of the filesystem.
pub fn reconcile(
    scripts: Vec<ChangeScript>,
    ledger: &LedgerSnapshot,
    test_identity: bool,
) -> Reconciliation {
    if ledger.forced_rebuild {
        return Reconciliation {
            state: LedgerState::ForcedRebuild,
            pending: scripts,
        };
    }

    let Some(latest) = &ledger.latest else {
        return if test_identity {
            Reconciliation {
                state: LedgerState::Fresh,
                pending: scripts,
            }
        } else {
            Reconciliation {
                state: LedgerState::Empty,
                pending: Vec::new(),
            }
        };
    };

    match scripts.iter().position(|s| s == latest) {
        Some(_) if test_identity => Reconciliation {
            state: LedgerState::Fresh,
            pending: scripts,
        },
        Some(position) => Reconciliation {
            state: LedgerState::InSync { position },
            pending: scripts.into_iter().skip(position + 1).collect(),
        },
        None => Reconciliation {
            state: LedgerState::Drifted {
                latest: latest.clone(),
            },
            pending: Vec::new(),
        },
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
