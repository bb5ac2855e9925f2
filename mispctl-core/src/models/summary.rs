//! Enable-all summary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counters produced by enabling every listed feed.
///
/// Invariant: `attempted <= total` and `succeeded + failed == attempted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnableSummary {
    /// Feeds returned by the listing.
    pub total: usize,
    /// Feeds with a resolvable identifier.
    pub attempted: usize,
    /// Feeds enabled successfully.
    pub succeeded: usize,
    /// Feeds for which every enable strategy failed.
    pub failed: usize,
}

impl EnableSummary {
    /// Creates an empty summary for `total` discovered feeds.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Records one attempted feed.
    pub fn record(&mut self, ok: bool) {
        self.attempted += 1;
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Returns true if no attempted feed failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Checks the counter invariant.
    pub fn is_consistent(&self) -> bool {
        self.attempted <= self.total && self.succeeded + self.failed == self.attempted
    }
}

impl fmt::Display for EnableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} attempted={} succeeded={} failed={}",
            self.total, self.attempted, self.succeeded, self.failed
        )
    }
}
