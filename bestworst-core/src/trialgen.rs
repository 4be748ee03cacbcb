/// Trial design strategies.
///
/// Public functions accept item labels and return groups of labels. Internal
/// functions work on `usize` pool indices. All randomness comes from the
/// caller's rng, so a seeded rng reproduces a design exactly.
use std::collections::HashSet;
use std::str::FromStr;

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::{MAX_PAIR_RETRIES, SEMIRANDOM_EVEN_FRACTION};
use crate::error::{BwsError, Result};
use crate::types::Item;

/// How groups of items are drawn from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Strategy {
    /// Independent uniform draws. No balance guarantee.
    Random,
    /// Every item appears equally often.
    Even,
    /// Random draws, but no pair of items ever shares two groups.
    /// Loops until it succeeds, so the pool must be large enough.
    NoRepeat,
    /// Even, preferring groups with unseen pairs. Recommended default.
    NoRepeatEven,
    /// Half the groups even, the rest random.
    SemiRandom,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Even => "even",
            Strategy::NoRepeat => "norepeat",
            Strategy::NoRepeatEven => "norepeateven",
            Strategy::SemiRandom => "semirandom",
        }
    }

    /// Whether this strategy requires `(n * k) % pool == 0`.
    pub fn requires_even_split(self) -> bool {
        matches!(self, Strategy::Even | Strategy::NoRepeatEven)
    }
}

impl FromStr for Strategy {
    type Err = BwsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Strategy::Random),
            "even" => Ok(Strategy::Even),
            "norepeat" => Ok(Strategy::NoRepeat),
            "norepeateven" => Ok(Strategy::NoRepeatEven),
            "semirandom" => Ok(Strategy::SemiRandom),
            _ => Err(BwsError::UnknownStrategy(s.to_string())),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Generate `n` groups of `k` items from `items` using `strategy`.
///
/// Best and worst are not assigned here; they come from the judgments
/// collected on each group. Configuration errors are returned before any
/// random draw is made.
pub fn generate_trials<R: Rng + ?Sized>(
    items: &[Item],
    n: usize,
    k: usize,
    strategy: Strategy,
    rng: &mut R,
) -> Result<Vec<Vec<Item>>> {
    let pool = items.len();
    validate_design(pool, n, k, strategy)?;

    let groups = match strategy {
        Strategy::Random => random_groups(pool, n, k, rng),
        Strategy::Even => balanced_groups(pool, n, k, false, rng).0,
        Strategy::NoRepeat => norepeat_groups(pool, n, k, rng),
        Strategy::NoRepeatEven => {
            let (groups, relaxed) = balanced_groups(pool, n, k, true, rng);
            if relaxed > 0 {
                warn!(
                    "pair-uniqueness relaxed for {relaxed} of {} groups after {MAX_PAIR_RETRIES} reshuffles each",
                    groups.len()
                );
            }
            groups
        }
        Strategy::SemiRandom => {
            let n_even = (n as f64 * SEMIRANDOM_EVEN_FRACTION) as usize;
            check_even_split(pool, n_even, k)?;
            let (mut groups, _) = balanced_groups(pool, n_even, k, false, rng);
            groups.extend(random_groups(pool, n - n_even, k, rng));
            groups
        }
    };

    debug!("generated {} {} groups of {} from {} items", groups.len(), strategy, k, pool);

    Ok(groups
        .into_iter()
        .map(|group| group.into_iter().map(|i| items[i].clone()).collect())
        .collect())
}

fn validate_design(pool: usize, n: usize, k: usize, strategy: Strategy) -> Result<()> {
    if pool == 0 {
        return Err(BwsError::EmptyPool);
    }
    if k < 2 || k > pool {
        return Err(BwsError::InvalidTrialSize { per_trial: k, pool });
    }
    if strategy.requires_even_split() {
        check_even_split(pool, n, k)?;
    }
    Ok(())
}

fn check_even_split(pool: usize, n: usize, k: usize) -> Result<()> {
    if (n * k) % pool != 0 {
        return Err(BwsError::UnevenDesign {
            trials: n,
            per_trial: k,
            pool,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal indexed generators (work with usize pool indices)
// ---------------------------------------------------------------------------

pub(crate) fn random_groups<R: Rng + ?Sized>(pool: usize, n: usize, k: usize, rng: &mut R) -> Vec<Vec<usize>> {
    (0..n)
        .map(|_| rand::seq::index::sample(rng, pool, k).into_vec())
        .collect()
}

/// Unordered pairs already used by accepted groups.
#[derive(Default)]
pub(crate) struct PairSet {
    seen: HashSet<(usize, usize)>,
}

impl PairSet {
    fn key(a: usize, b: usize) -> (usize, usize) {
        if a < b { (a, b) } else { (b, a) }
    }

    pub fn overlaps(&self, group: &[usize]) -> bool {
        group_pairs(group).any(|(a, b)| self.seen.contains(&Self::key(a, b)))
    }

    pub fn insert_group(&mut self, group: &[usize]) {
        for (a, b) in group_pairs(group) {
            self.seen.insert(Self::key(a, b));
        }
    }
}

fn group_pairs(group: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    group
        .iter()
        .enumerate()
        .flat_map(move |(i, &a)| group[i + 1..].iter().map(move |&b| (a, b)))
}

/// Rejection sampling on pair overlap. No retry limit.
pub(crate) fn norepeat_groups<R: Rng + ?Sized>(pool: usize, n: usize, k: usize, rng: &mut R) -> Vec<Vec<usize>> {
    let mut pairs = PairSet::default();
    let mut groups = Vec::with_capacity(n);
    let mut rejected: u64 = 0;

    while groups.len() < n {
        let candidate = rand::seq::index::sample(rng, pool, k).into_vec();
        if pairs.overlaps(&candidate) {
            rejected += 1;
            continue;
        }
        pairs.insert_group(&candidate);
        groups.push(candidate);
    }

    debug!("norepeat rejected {rejected} candidate groups");
    groups
}

/// Passes over freshly shuffled copies of the pool, cut into groups of `k`.
///
/// When the pool is not a multiple of `k`, the leftover tail of one pass is
/// completed from the next pass; items already in the group are skipped and
/// picked up by the following group. Every item therefore appears exactly
/// `n * k / pool` times and never twice in one group.
///
/// With `unique_pairs`, a candidate overlapping a used pair reshuffles the
/// rest of the pass. After `MAX_PAIR_RETRIES` consecutive failures the
/// candidate is accepted anyway. Returns the groups and how many of them
/// were accepted that way.
pub(crate) fn balanced_groups<R: Rng + ?Sized>(
    pool: usize,
    n: usize,
    k: usize,
    unique_pairs: bool,
    rng: &mut R,
) -> (Vec<Vec<usize>>, usize) {
    let passes = n * k / pool;
    let mut groups: Vec<Vec<usize>> = Vec::with_capacity(n);
    let mut pairs = PairSet::default();
    let mut carry: Vec<usize> = Vec::with_capacity(k);
    let mut relaxed = 0usize;

    for _ in 0..passes {
        let mut remaining: Vec<usize> = (0..pool).collect();
        remaining.shuffle(rng);
        let mut fails = 0usize;

        loop {
            let needed = k - carry.len();
            let picks: Vec<usize> = remaining
                .iter()
                .enumerate()
                .filter(|(_, item)| !carry.contains(*item))
                .map(|(pos, _)| pos)
                .take(needed)
                .collect();
            if picks.len() < needed {
                break;
            }

            let mut candidate = carry.clone();
            candidate.extend(picks.iter().map(|&pos| remaining[pos]));

            if unique_pairs && pairs.overlaps(&candidate) {
                if fails < MAX_PAIR_RETRIES {
                    remaining.shuffle(rng);
                    fails += 1;
                    continue;
                }
                relaxed += 1;
            }

            if unique_pairs {
                pairs.insert_group(&candidate);
            }
            for &pos in picks.iter().rev() {
                remaining.remove(pos);
            }
            groups.push(candidate);
            carry.clear();
            fails = 0;
        }

        // Leftovers are distinct: carry is only non-empty across a pass boundary.
        carry.append(&mut remaining);
    }

    debug_assert!(carry.is_empty(), "even split leaves no leftovers");
    debug_assert_eq!(groups.len(), n);

    (groups, relaxed)
}
