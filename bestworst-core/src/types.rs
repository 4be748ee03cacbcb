use std::collections::{HashMap, HashSet};

use crate::error::{BwsError, Result};

/// An item label. Items are compared by label only.
pub type Item = String;

/// One judged best-worst trial.
///
/// `best` and `worst` are never equal and never repeated in `others`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trial {
    pub best: Item,
    pub worst: Item,
    /// The unchosen middle items, in presentation order.
    pub others: Vec<Item>,
}

impl Trial {
    /// Build a trial. Every item may appear only once, so best and worst must
    /// differ and neither may be listed among `others`.
    ///
    /// Errors are `InvalidTrial`; parsers rewrap them with a row number.
    pub fn new(best: impl Into<Item>, worst: impl Into<Item>, others: Vec<Item>) -> Result<Self> {
        let trial = Trial {
            best: best.into(),
            worst: worst.into(),
            others,
        };
        trial.validate()?;
        Ok(trial)
    }

    /// Check the trial invariants on a trial built field by field.
    pub fn validate(&self) -> Result<()> {
        if self.best == self.worst {
            return Err(BwsError::InvalidTrial(format!("\"{}\" is both best and worst", self.best)));
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(self.size());
        seen.insert(&self.best);
        seen.insert(&self.worst);
        match self.others.iter().find(|item| !seen.insert(item.as_str())) {
            Some(dup) => Err(BwsError::InvalidTrial(format!("\"{dup}\" appears more than once"))),
            None => Ok(()),
        }
    }

    /// Number of items shown (K).
    pub fn size(&self) -> usize {
        self.others.len() + 2
    }

    /// All items in the trial: best, worst, then the others.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        std::iter::once(&self.best)
            .chain(std::iter::once(&self.worst))
            .chain(self.others.iter())
    }
}

/// A directed comparison: `winner` was preferred over `loser` within one trial.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pairing {
    pub winner: Item,
    pub loser: Item,
}

impl Pairing {
    pub fn new(winner: impl Into<Item>, loser: impl Into<Item>) -> Self {
        Pairing {
            winner: winner.into(),
            loser: loser.into(),
        }
    }
}

/// Anything that can hold a rating during a scoring run.
///
/// The two anchors are synthetic players that beat, or lose to, every real
/// item once per pass. They keep the iterative ratings in a bounded range
/// and never appear in output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Entrant {
    Real(Item),
    AnchorWin,
    AnchorLose,
}

impl Entrant {
    pub fn as_real(&self) -> Option<&Item> {
        match self {
            Entrant::Real(item) => Some(item),
            Entrant::AnchorWin | Entrant::AnchorLose => None,
        }
    }
}

/// Internal indexed pairing (winner key, loser key).
pub(crate) type IndexedPairing = (usize, usize);

/// Interns entrants into stable `0..N` keys, in first-appearance order.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntrantMap {
    entrants: Vec<Entrant>,
    key_of: HashMap<Entrant, usize>,
}

impl EntrantMap {
    /// Key for `entrant`, assigning the next free key if it is new.
    pub fn intern(&mut self, entrant: Entrant) -> usize {
        if let Some(&key) = self.key_of.get(&entrant) {
            return key;
        }
        let key = self.entrants.len();
        self.key_of.insert(entrant.clone(), key);
        self.entrants.push(entrant);
        key
    }

    pub fn len(&self) -> usize {
        self.entrants.len()
    }

    pub fn key(&self, entrant: &Entrant) -> Option<usize> {
        self.key_of.get(entrant).copied()
    }

    /// Key of a real item, or `UnknownItem`.
    pub fn real_key(&self, item: &str) -> Result<usize> {
        self.key(&Entrant::Real(item.to_string()))
            .ok_or_else(|| BwsError::UnknownItem(item.to_string()))
    }

    pub fn entrant(&self, key: usize) -> &Entrant {
        &self.entrants[key]
    }

    /// Keys of real items, in first-appearance order.
    pub fn real_keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.entrants
            .iter()
            .enumerate()
            .filter(|(_, e)| e.as_real().is_some())
            .map(|(key, _)| key)
    }

    pub fn convert_pairings(&self, pairings: &[Pairing]) -> Result<Vec<IndexedPairing>> {
        pairings
            .iter()
            .map(|p| Ok((self.real_key(&p.winner)?, self.real_key(&p.loser)?)))
            .collect()
    }
}
