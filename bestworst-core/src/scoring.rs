/// Scoring methods, the result table they fill, and `score_trials`, which
/// runs a whole scoring pass over judged trials.
use std::str::FromStr;

use log::debug;
use rand::Rng;

use crate::aggregate;
use crate::constants::DEFAULT_ITERATIONS;
use crate::engine::ScoringRun;
use crate::entry::ItemEntry;
use crate::error::{BwsError, Result};
use crate::pairings::compile_pairings;
use crate::types::{Item, Trial};

/// Every supported scoring method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    // From trial counts
    Best,
    Worst,
    Unchosen,
    BestWorst,
    BestWorstLogit,
    Abw,
    David,

    // From pairing counts
    Wins,
    Losses,
    Ties,
    WinLoss,
    WinLossLogit,

    // Iterative
    Elo,
    Value,
    Rw,
    EloLogit,
    ValueLogit,
    RwLogit,
}

impl Method {
    pub const ALL: [Method; 18] = [
        Method::Best,
        Method::Worst,
        Method::Unchosen,
        Method::BestWorst,
        Method::BestWorstLogit,
        Method::Abw,
        Method::David,
        Method::Wins,
        Method::Losses,
        Method::Ties,
        Method::WinLoss,
        Method::WinLossLogit,
        Method::Elo,
        Method::Value,
        Method::Rw,
        Method::EloLogit,
        Method::ValueLogit,
        Method::RwLogit,
    ];

    /// The methods reported when the caller does not choose.
    pub const DEFAULT: [Method; 12] = [
        Method::Value,
        Method::Elo,
        Method::Rw,
        Method::Best,
        Method::Worst,
        Method::Unchosen,
        Method::BestWorst,
        Method::Abw,
        Method::David,
        Method::ValueLogit,
        Method::RwLogit,
        Method::BestWorstLogit,
    ];

    /// Column name used in output.
    pub fn name(self) -> &'static str {
        match self {
            Method::Best => "Best",
            Method::Worst => "Worst",
            Method::Unchosen => "Unchosen",
            Method::BestWorst => "BestWorst",
            Method::BestWorstLogit => "BestWorstLogit",
            Method::Abw => "ABW",
            Method::David => "David",
            Method::Wins => "Wins",
            Method::Losses => "Losses",
            Method::Ties => "Ties",
            Method::WinLoss => "WinLoss",
            Method::WinLossLogit => "WinLossLogit",
            Method::Elo => "Elo",
            Method::Value => "Value",
            Method::Rw => "RW",
            Method::EloLogit => "EloLogit",
            Method::ValueLogit => "ValueLogit",
            Method::RwLogit => "RWLogit",
        }
    }

    fn score(self, entry: &ItemEntry, entries: &[ItemEntry], elo_range: (f64, f64)) -> f64 {
        match self {
            Method::Best => entry.best as f64,
            Method::Worst => entry.worst as f64,
            Method::Unchosen => aggregate::unchosen(entry) as f64,
            Method::BestWorst => aggregate::best_worst(entry),
            Method::BestWorstLogit => aggregate::best_worst_logit(entry),
            Method::Abw => aggregate::analytic_best_worst(entry),
            Method::David => aggregate::david(entry, entries),
            Method::Wins => entry.wins as f64,
            Method::Losses => entry.losses as f64,
            Method::Ties => entry.unranked as f64,
            Method::WinLoss => aggregate::win_loss(entry),
            Method::WinLossLogit => aggregate::win_loss_logit(entry),
            Method::Elo => entry.elo,
            Method::Value => entry.value,
            Method::Rw => entry.reswag_probability(),
            Method::EloLogit => aggregate::elo_logit(entry, elo_range.0, elo_range.1),
            Method::ValueLogit => aggregate::value_logit(entry),
            Method::RwLogit => aggregate::reswag_logit(entry),
        }
    }

    /// Parse a comma-separated method list, e.g. `"Value,Elo,ABW"`.
    pub fn parse_list(list: &str) -> Result<Vec<Method>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for Method {
    type Err = BwsError;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BwsError::UnknownMethod(s.to_string()))
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One item's scores, in the table's method order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredItem {
    pub item: Item,
    pub scores: Vec<f64>,
}

/// Scores for every real item under every requested method.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreTable {
    pub methods: Vec<Method>,
    /// One row per item, in order of first appearance in the trials.
    pub rows: Vec<ScoredItem>,
}

impl ScoreTable {
    fn column(&self, method: Method) -> Option<usize> {
        self.methods.iter().position(|&m| m == method)
    }

    pub fn get(&self, item: &str, method: Method) -> Option<f64> {
        let col = self.column(method)?;
        self.rows.iter().find(|r| r.item == item).map(|r| r.scores[col])
    }

    /// Rows sorted by `method`, highest first. Stable: ties keep table order.
    /// `None` if the table has no such column.
    pub fn ranked_by(&self, method: Method) -> Option<Vec<&ScoredItem>> {
        let col = self.column(method)?;
        let mut ranked: Vec<&ScoredItem> = self.rows.iter().collect();
        ranked.sort_by(|a, b| b.scores[col].total_cmp(&a.scores[col]));
        Some(ranked)
    }
}

impl ScoringRun {
    /// Evaluate `methods` for every real item. Reads state only.
    pub fn score_table(&self, methods: &[Method]) -> ScoreTable {
        let entries = self.entries();
        let elo_range = self
            .real_keys()
            .map(|key| entries[key].elo)
            .fold(None, |range: Option<(f64, f64)>, elo| match range {
                None => Some((elo, elo)),
                Some((lo, hi)) => Some((lo.min(elo), hi.max(elo))),
            })
            .unwrap_or((0.0, 0.0));

        let rows = self
            .items()
            .map(|(item, entry)| ScoredItem {
                item: item.clone(),
                scores: methods
                    .iter()
                    .map(|m| m.score(entry, entries, elo_range))
                    .collect(),
            })
            .collect();

        ScoreTable {
            methods: methods.to_vec(),
            rows,
        }
    }
}

/// Options for `score_trials()`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoringOptions {
    pub methods: Vec<Method>,
    /// Passes over the pairings for the iterative methods. Must be >= 1.
    pub iterations: usize,
    /// Bound the iterative scores with always-win / always-lose anchors.
    pub use_dummy_anchors: bool,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        ScoringOptions {
            methods: Method::DEFAULT.to_vec(),
            iterations: DEFAULT_ITERATIONS,
            use_dummy_anchors: true,
        }
    }
}

/// Score judged trials: ingest counts, compile pairings, run the iterative
/// rules, and emit one row per item. A trial that repeats an item is
/// rejected with its 1-based position.
pub fn score_trials<R: Rng + ?Sized>(
    trials: &[Trial],
    options: &ScoringOptions,
    rng: &mut R,
) -> Result<ScoreTable> {
    if options.iterations == 0 {
        return Err(BwsError::ZeroIterations);
    }
    for (i, trial) in trials.iter().enumerate() {
        trial.validate().map_err(|err| match err {
            BwsError::InvalidTrial(reason) => BwsError::MalformedTrial { row: i + 1, reason },
            other => other,
        })?;
    }

    let mut run = ScoringRun::from_trials(trials);
    let pairings = compile_pairings(trials);
    run.score_iterative(&pairings, options.iterations, options.use_dummy_anchors, rng)?;

    debug!("scored {} items with {} methods", run.num_items(), options.methods.len());
    Ok(run.score_table(&options.methods))
}
