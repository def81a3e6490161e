// Profile classification: explainable heuristic scoring.
//
// Signals are extracted once per profile, each classifier turns them into
// a score plus the reasons that fired, and the verdict resolver picks a
// single category for the run's mode. Everything here is pure.

pub mod bot;
pub mod marketer;
pub mod signals;
pub mod verdict;

/// Output of one classifier: additive score and the reasons that fired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub score: u32,
    /// In evaluation order.
    pub reasons: Vec<String>,
}

impl Classification {
    pub(crate) fn add(&mut self, points: u32, reason: impl Into<String>) {
        self.score += points;
        self.reasons.push(reason.into());
    }
}
