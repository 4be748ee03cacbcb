/// Turns judged trials into directed win/loss pairings.
///
/// A trial of size K yields `2K - 3` pairings: best beats everything else,
/// and every middle item beats worst. Middle items are never ordered against
/// each other.
use crate::types::{Pairing, Trial};

/// Compile trials into pairings, in trial order.
///
/// Per trial: best over worst and over each middle item, then each middle
/// item over worst. Deterministic.
pub fn compile_pairings(trials: &[Trial]) -> Vec<Pairing> {
    let total: usize = trials.iter().map(pairings_per_trial).sum();
    let mut pairings = Vec::with_capacity(total);

    for trial in trials {
        pairings.push(Pairing::new(trial.best.clone(), trial.worst.clone()));
        for other in &trial.others {
            pairings.push(Pairing::new(trial.best.clone(), other.clone()));
        }
        for other in &trial.others {
            pairings.push(Pairing::new(other.clone(), trial.worst.clone()));
        }
    }

    pairings
}

/// Number of pairings one trial contributes.
pub fn pairings_per_trial(trial: &Trial) -> usize {
    2 * trial.size() - 3
}
