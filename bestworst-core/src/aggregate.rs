/// Closed-form scores computed directly from an entry's counts.
///
/// Nothing here iterates or draws random numbers; every function is a pure
/// read of the entry (and, for David's score, of its opponents' entries).
use crate::entry::ItemEntry;
use crate::numeric::{clamp01, clamp_ratio, logit, rescale_signed_unit};

/// Times shown but picked as neither best nor worst.
pub fn unchosen(entry: &ItemEntry) -> u64 {
    entry.trials - entry.best - entry.worst
}

/// Net pairing wins per trial shown, mapped onto `[0, 1]`.
pub fn best_worst(entry: &ItemEntry) -> f64 {
    let net = entry.wins as f64 - entry.losses as f64;
    clamp01(rescale_signed_unit(net / per_trial_denominator(entry)))
}

pub fn best_worst_logit(entry: &ItemEntry) -> f64 {
    logit(best_worst(entry))
}

/// Analytic best-worst score (Marley, Islam & Hawkins, 2016).
pub fn analytic_best_worst(entry: &ItemEntry) -> f64 {
    let ratio = (entry.best as f64 - entry.worst as f64) / per_trial_denominator(entry);
    let ratio = clamp_ratio(ratio);
    ((1.0 + ratio) / (1.0 - ratio)).ln()
}

/// H. David's (1987) score for unbalanced designs: the total wins of every
/// opponent beaten, minus the total losses of every opponent lost to.
pub fn david(entry: &ItemEntry, entries: &[ItemEntry]) -> f64 {
    let won: u64 = entry.beat.iter().map(|&opp| entries[opp].wins).sum();
    let lost: u64 = entry.lose.iter().map(|&opp| entries[opp].losses).sum();
    won as f64 - lost as f64
}

/// Net wins over all matches, unranked ones included, mapped onto `[0, 1]`.
pub fn win_loss(entry: &ItemEntry) -> f64 {
    let matches = (entry.wins + entry.losses + entry.unranked).max(1) as f64;
    rescale_signed_unit((entry.wins as f64 - entry.losses as f64) / matches)
}

pub fn win_loss_logit(entry: &ItemEntry) -> f64 {
    logit(win_loss(entry))
}

pub fn value_logit(entry: &ItemEntry) -> f64 {
    logit(entry.value)
}

pub fn reswag_logit(entry: &ItemEntry) -> f64 {
    logit(entry.reswag_probability())
}

/// Elo rescaled into `[0, 1]` over the given range, then logit-transformed.
/// A degenerate range (every item rated the same) maps to even odds.
pub fn elo_logit(entry: &ItemEntry, elo_min: f64, elo_max: f64) -> f64 {
    let range = elo_max - elo_min;
    let scaled = if range > 0.0 {
        (entry.elo - elo_min) / range
    } else {
        0.5
    };
    logit(scaled)
}

fn per_trial_denominator(entry: &ItemEntry) -> f64 {
    entry.trials.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(trials: u64, best: u64, worst: u64) -> ItemEntry {
        ItemEntry { trials, best, worst, ..Default::default() }
    }

    #[test]
    fn test_unchosen() {
        assert_eq!(unchosen(&counts(10, 3, 2)), 5);
    }

    #[test]
    fn test_abw_neutral_and_signed() {
        assert!(analytic_best_worst(&counts(4, 1, 1)).abs() < 1e-12);
        assert!(analytic_best_worst(&counts(4, 3, 0)) > 0.0);
        assert!(analytic_best_worst(&counts(4, 0, 3)) < 0.0);
    }

    #[test]
    fn test_abw_always_best_is_finite() {
        let score = analytic_best_worst(&counts(5, 5, 0));
        assert!(score.is_finite());
        assert!((score - (1.9999f64 / 0.0001).ln()).abs() < 1e-9);
    }

    #[test]
    fn test_best_worst_is_clamped() {
        let mut entry = counts(2, 2, 0);
        entry.wins = 600;
        assert_eq!(best_worst(&entry), 1.0);
        entry.wins = 0;
        entry.losses = 600;
        assert_eq!(best_worst(&entry), 0.0);
        assert!(best_worst_logit(&entry).is_finite());
    }

    #[test]
    fn test_win_loss_counts_unranked_matches() {
        let entry = ItemEntry { wins: 3, losses: 1, unranked: 4, ..Default::default() };
        assert!((win_loss(&entry) - 0.625).abs() < 1e-12);
        assert!(win_loss_logit(&entry) > 0.0);

        let empty = ItemEntry::default();
        assert_eq!(win_loss(&empty), 0.5);
    }

    #[test]
    fn test_david_weights_by_opponent_record() {
        let mut entries = vec![ItemEntry::default(), ItemEntry::default(), ItemEntry::default()];
        entries[1].wins = 10;
        entries[2].losses = 4;
        entries[0].beat.insert(1);
        entries[0].lose.insert(2);
        assert_eq!(david(&entries[0], &entries), 6.0);
    }

    #[test]
    fn test_elo_logit_degenerate_range() {
        let entry = ItemEntry { elo: 12.0, ..Default::default() };
        assert_eq!(elo_logit(&entry, 12.0, 12.0), 0.0);
        assert!(elo_logit(&entry, 0.0, 12.0) > 9.0);
    }

    #[test]
    fn test_reswag_logit_without_exposure() {
        assert_eq!(reswag_logit(&ItemEntry::default()), 0.0);
        assert_eq!(value_logit(&ItemEntry::default()), 0.0);
    }
}
