/// Per-entrant rating state and the three iterative update rules.
///
/// Internal module: entries live in an arena owned by a `ScoringRun` and
/// refer to their opponents by arena key.
use std::collections::HashSet;

use crate::constants::{
    BASE_LEARNING_RATE, ELO_K_FACTOR, ELO_SCALE, INITIAL_ELO, INITIAL_VALUE, PROBABILITY_FLOOR,
};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemEntry {
    pub elo: f64,

    /// Pairing outcomes, counted on every processed pairing in every iteration.
    pub wins: u64,
    pub losses: u64,

    /// Trial participation, counted once per ingested trial.
    pub trials: u64,
    pub best: u64,
    pub worst: u64,
    /// Unranked matches: each middle item gains K-3 per trial.
    pub unranked: u64,

    /// Value-discrimination estimate, strictly inside (0, 1).
    pub value: f64,

    /// Rescorla-Wagner association strengths with winning and losing.
    pub reswag_win: f64,
    pub reswag_lose: f64,

    /// Arena keys of opponents this entrant has beaten / lost to.
    pub beat: HashSet<usize>,
    pub lose: HashSet<usize>,
}

impl Default for ItemEntry {
    fn default() -> Self {
        ItemEntry {
            elo: INITIAL_ELO,
            wins: 0,
            losses: 0,
            trials: 0,
            best: 0,
            worst: 0,
            unranked: 0,
            value: INITIAL_VALUE,
            reswag_win: 0.0,
            reswag_lose: 0.0,
            beat: HashSet::new(),
            lose: HashSet::new(),
        }
    }
}

impl ItemEntry {
    /// Rescorla-Wagner win weight; 0.5 for an entrant with no exposure.
    pub fn reswag_probability(&self) -> f64 {
        let total = self.reswag_win + self.reswag_lose;
        if total == 0.0 {
            0.5
        } else {
            self.reswag_win / total
        }
    }
}

/// Learning rate for the 1-indexed `iteration`.
pub(crate) fn learning_rate(iteration: usize) -> f64 {
    BASE_LEARNING_RATE / iteration as f64
}

/// Apply every update rule for one pairing. `winner != loser`.
pub(crate) fn record_win(entries: &mut [ItemEntry], winner: usize, loser: usize, iteration: usize) {
    let (w, l) = pair_mut(entries, winner, loser);
    update_elo(w, l);
    update_value(w, l, iteration);
    update_reswag(w, l, iteration);

    w.beat.insert(loser);
    l.lose.insert(winner);
}

/// Zero-sum Elo update with K = 30.
pub(crate) fn update_elo(winner: &mut ItemEntry, loser: &mut ItemEntry) {
    winner.wins += 1;
    loser.losses += 1;

    let q_w = 10f64.powf(winner.elo / ELO_SCALE);
    let q_l = 10f64.powf(loser.elo / ELO_SCALE);
    let expected_w = q_w / (q_w + q_l);
    let delta = ELO_K_FACTOR * (1.0 - expected_w);
    winner.elo += delta;
    loser.elo -= delta;
}

/// Value-discrimination update. Surprising wins (weak beats strong) move
/// both values further than expected ones.
pub(crate) fn update_value(winner: &mut ItemEntry, loser: &mut ItemEntry, iteration: usize) {
    let rate = learning_rate(iteration);

    let r_w = winner.value / (1.0 - winner.value);
    let r_l = loser.value / (1.0 - loser.value);
    let salience = 1.0 - r_w / (r_w + r_l);

    winner.value += salience * rate * (1.0 - winner.value);
    loser.value += salience * rate * (0.0 - loser.value);
}

/// Rescorla-Wagner update: the winner associates with winning, the loser
/// with losing, each toward a total strength of 1.
pub(crate) fn update_reswag(winner: &mut ItemEntry, loser: &mut ItemEntry, iteration: usize) {
    let rate = learning_rate(iteration);

    let w_total = winner.reswag_win + winner.reswag_lose;
    let l_total = loser.reswag_win + loser.reswag_lose;

    let r_w = odds(winner.reswag_probability());
    let r_l = odds(loser.reswag_probability());
    let salience = if r_w + r_l == 0.0 {
        1.0
    } else {
        1.0 - r_w / (r_w + r_l)
    };

    winner.reswag_win += salience * rate * (1.0 - w_total);
    loser.reswag_lose += salience * rate * (1.0 - l_total);
}

fn odds(p: f64) -> f64 {
    p / (1.0 - p).max(PROBABILITY_FLOOR)
}

/// Two distinct mutable entries from the arena.
fn pair_mut(entries: &mut [ItemEntry], a: usize, b: usize) -> (&mut ItemEntry, &mut ItemEntry) {
    assert_ne!(a, b, "an entrant cannot be paired against itself");
    if a < b {
        let (lo, hi) = entries.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = entries.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elo_is_zero_sum() {
        let mut w = ItemEntry { elo: 120.0, ..Default::default() };
        let mut l = ItemEntry { elo: -35.0, ..Default::default() };
        let (w0, l0) = (w.elo, l.elo);
        update_elo(&mut w, &mut l);
        let dw = w.elo - w0;
        let dl = l.elo - l0;
        assert!(dw > 0.0);
        assert!((dw + dl).abs() < 1e-12);
        assert_eq!((w.wins, l.losses), (1, 1));
    }

    #[test]
    fn test_elo_even_match_moves_half_k() {
        let mut w = ItemEntry::default();
        let mut l = ItemEntry::default();
        update_elo(&mut w, &mut l);
        assert!((w.elo - 15.0).abs() < 1e-12);
        assert!((l.elo + 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_upset_moves_elo_more() {
        let mut strong = ItemEntry { elo: 200.0, ..Default::default() };
        let mut weak = ItemEntry { elo: -200.0, ..Default::default() };
        update_elo(&mut weak, &mut strong);
        let upset_delta = weak.elo + 200.0;

        let mut strong = ItemEntry { elo: 200.0, ..Default::default() };
        let mut weak = ItemEntry { elo: -200.0, ..Default::default() };
        update_elo(&mut strong, &mut weak);
        let expected_delta = strong.elo - 200.0;

        assert!(upset_delta > expected_delta);
    }

    #[test]
    fn test_value_first_update() {
        let mut w = ItemEntry::default();
        let mut l = ItemEntry::default();
        update_value(&mut w, &mut l, 1);
        // salience 0.5, rate 0.025: 0.5 +/- 0.5 * 0.025 * 0.5
        assert!((w.value - 0.50625).abs() < 1e-12);
        assert!((l.value - 0.49375).abs() < 1e-12);
    }

    #[test]
    fn test_rate_decays_with_iteration() {
        let mut w1 = ItemEntry::default();
        let mut l1 = ItemEntry::default();
        update_value(&mut w1, &mut l1, 1);

        let mut w10 = ItemEntry::default();
        let mut l10 = ItemEntry::default();
        update_value(&mut w10, &mut l10, 10);

        assert!((w1.value - 0.5) > (w10.value - 0.5) * 9.9);
    }

    #[test]
    fn test_reswag_no_exposure_defaults() {
        let mut w = ItemEntry::default();
        let mut l = ItemEntry::default();
        update_reswag(&mut w, &mut l, 1);
        assert!((w.reswag_win - 0.0125).abs() < 1e-12);
        assert!((l.reswag_lose - 0.0125).abs() < 1e-12);
        assert_eq!(w.reswag_lose, 0.0);
        assert_eq!(l.reswag_win, 0.0);
        assert_eq!(w.reswag_probability(), 1.0);
        assert_eq!(l.reswag_probability(), 0.0);
    }

    #[test]
    fn test_reswag_both_certain_losers_uses_full_salience() {
        // Both sides have only ever lost: both odds are 0.
        let mut w = ItemEntry { reswag_lose: 0.2, ..Default::default() };
        let mut l = ItemEntry { reswag_lose: 0.4, ..Default::default() };
        update_reswag(&mut w, &mut l, 1);
        assert!((w.reswag_win - 0.025 * 0.8).abs() < 1e-12);
        assert!((l.reswag_lose - (0.4 + 0.025 * 0.6)).abs() < 1e-12);
    }

    #[test]
    fn test_record_win_tracks_opponents() {
        let mut entries = vec![ItemEntry::default(), ItemEntry::default(), ItemEntry::default()];
        record_win(&mut entries, 2, 0, 1);
        record_win(&mut entries, 0, 1, 1);

        assert!(entries[2].beat.contains(&0));
        assert!(entries[0].lose.contains(&2));
        assert!(entries[0].beat.contains(&1));
        assert!(entries[1].lose.contains(&0));
        assert_eq!(entries[0].wins, 1);
        assert_eq!(entries[0].losses, 1);
    }

    #[test]
    #[should_panic(expected = "paired against itself")]
    fn test_self_pairing_panics() {
        let mut entries = vec![ItemEntry::default()];
        record_win(&mut entries, 0, 0, 1);
    }
}
