/// Scoring run: owns the per-entrant state for one scoring pass.
///
/// Items are identified by their labels. The run interns them into an arena
/// of `ItemEntry` keyed by `usize`, so opponents are tracked by key and no
/// entry ever references another directly.
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::entry::{record_win, ItemEntry};
use crate::error::{BwsError, Result};
use crate::types::{Entrant, EntrantMap, IndexedPairing, Item, Pairing, Trial};

#[derive(Debug, Clone, Default)]
pub struct ScoringRun {
    entrants: EntrantMap,
    entries: Vec<ItemEntry>,
}

impl ScoringRun {
    /// Create one entry per distinct item and ingest the trial counts.
    ///
    /// Items are keyed in order of first appearance, so two runs over the
    /// same trials are laid out identically.
    pub fn from_trials(trials: &[Trial]) -> Self {
        let mut run = ScoringRun::default();

        for trial in trials {
            let best = run.intern(Entrant::Real(trial.best.clone()));
            let worst = run.intern(Entrant::Real(trial.worst.clone()));
            let others: Vec<usize> = trial
                .others
                .iter()
                .map(|o| run.intern(Entrant::Real(o.clone())))
                .collect();

            run.entries[best].best += 1;
            run.entries[worst].worst += 1;
            for &key in [best, worst].iter().chain(others.iter()) {
                run.entries[key].trials += 1;
            }
            // Unranked matches, not trials: each middle item is unordered
            // against every other middle item.
            let unranked = others.len().saturating_sub(1) as u64;
            for &key in &others {
                run.entries[key].unranked += unranked;
            }
        }

        debug!("ingested {} trials over {} items", trials.len(), run.num_items());
        run
    }

    fn intern(&mut self, entrant: Entrant) -> usize {
        let key = self.entrants.intern(entrant);
        if key == self.entries.len() {
            self.entries.push(ItemEntry::default());
        }
        debug_assert_eq!(self.entrants.len(), self.entries.len());
        key
    }

    /// Number of real items (anchors excluded).
    pub fn num_items(&self) -> usize {
        self.entrants.real_keys().count()
    }

    pub fn has_anchors(&self) -> bool {
        self.entrants.key(&Entrant::AnchorWin).is_some()
    }

    /// State of a real item.
    pub fn entry(&self, item: &str) -> Option<&ItemEntry> {
        self.entrants.real_key(item).ok().map(|key| &self.entries[key])
    }

    /// State of any entrant, anchors included.
    pub fn entrant_entry(&self, entrant: &Entrant) -> Option<&ItemEntry> {
        self.entrants.key(entrant).map(|key| &self.entries[key])
    }

    /// Real items with their state, in first-appearance order.
    pub fn items(&self) -> impl Iterator<Item = (&Item, &ItemEntry)> + '_ {
        self.entrants.real_keys().filter_map(move |key| {
            self.entrants
                .entrant(key)
                .as_real()
                .map(|item| (item, &self.entries[key]))
        })
    }

    pub(crate) fn entries(&self) -> &[ItemEntry] {
        &self.entries
    }

    pub(crate) fn real_keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.entrants.real_keys()
    }

    /// Run the Elo, value and Rescorla-Wagner rules over `pairings`.
    ///
    /// Each of the `iterations` passes shuffles the pairings with `rng` and
    /// applies them one at a time, so later pairings see earlier updates from
    /// the same pass. With `use_dummy_anchors`, every real item also loses
    /// once to the always-wins anchor and beats the always-loses anchor per
    /// pass.
    pub fn score_iterative<R: Rng + ?Sized>(
        &mut self,
        pairings: &[Pairing],
        iterations: usize,
        use_dummy_anchors: bool,
        rng: &mut R,
    ) -> Result<()> {
        if iterations == 0 {
            return Err(BwsError::ZeroIterations);
        }

        let mut indexed = self.entrants.convert_pairings(pairings)?;
        if use_dummy_anchors {
            indexed.extend(self.anchor_pairings());
        }

        debug!(
            "running {} iterations over {} pairings ({} entrants)",
            iterations,
            indexed.len(),
            self.entries.len()
        );

        for iteration in 1..=iterations {
            indexed.shuffle(rng);
            for &(winner, loser) in &indexed {
                record_win(&mut self.entries, winner, loser, iteration);
            }
        }

        Ok(())
    }

    /// `(AnchorWin, item)` and `(item, AnchorLose)` for every real item.
    fn anchor_pairings(&mut self) -> Vec<IndexedPairing> {
        let real: Vec<usize> = self.entrants.real_keys().collect();
        let always_wins = self.intern(Entrant::AnchorWin);
        let always_loses = self.intern(Entrant::AnchorLose);

        let mut pairings = Vec::with_capacity(real.len() * 2);
        for key in real {
            pairings.push((always_wins, key));
            pairings.push((key, always_loses));
        }
        pairings
    }
}
