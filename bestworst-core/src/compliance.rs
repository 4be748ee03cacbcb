//! Rater compliance: how often each participant's picks agree with the
//! consensus ordering produced by a scoring run.
use std::collections::HashMap;

use log::debug;

use crate::error::{BwsError, Result};
use crate::pairings::compile_pairings;
use crate::types::{Item, Trial};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantCompliance {
    pub participant: String,
    /// Pairings where the consensus score of the winner beats the loser's.
    pub consistent: usize,
    pub pairings: usize,
    /// `consistent / pairings`.
    pub accuracy: f64,
    /// The participant's trials, in the order they were given.
    pub trials: Vec<Trial>,
}

/// Check every response against `scores` and summarise per participant.
///
/// Each trial is expanded into its pairings; a pairing is consistent when
/// the winner scores strictly higher than the loser. The report is sorted by
/// accuracy, highest first, with ties in first-appearance order.
pub fn assess_compliance(
    responses: &[(String, Trial)],
    scores: &HashMap<Item, f64>,
) -> Result<Vec<ParticipantCompliance>> {
    let score_of = |item: &Item| {
        scores
            .get(item)
            .copied()
            .ok_or_else(|| BwsError::UnknownItem(item.clone()))
    };

    let mut report: Vec<ParticipantCompliance> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for (participant, trial) in responses {
        let idx = *slot.entry(participant.as_str()).or_insert_with(|| {
            report.push(ParticipantCompliance {
                participant: participant.clone(),
                consistent: 0,
                pairings: 0,
                accuracy: 0.0,
                trials: Vec::new(),
            });
            report.len() - 1
        });

        let pairings = compile_pairings(std::slice::from_ref(trial));
        let mut consistent = 0;
        for pairing in &pairings {
            if score_of(&pairing.winner)? > score_of(&pairing.loser)? {
                consistent += 1;
            }
        }

        let entry = &mut report[idx];
        entry.consistent += consistent;
        entry.pairings += pairings.len();
        entry.trials.push(trial.clone());
    }

    for entry in &mut report {
        entry.accuracy = entry.consistent as f64 / entry.pairings.max(1) as f64;
    }
    report.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy));

    debug!("assessed {} responses from {} participants", responses.len(), report.len());
    Ok(report)
}

/// Participants whose accuracy is at least `threshold`, order preserved.
pub fn retain_compliant(report: Vec<ParticipantCompliance>, threshold: f64) -> Vec<ParticipantCompliance> {
    report.into_iter().filter(|p| p.accuracy >= threshold).collect()
}
