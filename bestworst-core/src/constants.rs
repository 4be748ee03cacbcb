/// Starting Elo rating for every entrant.
pub const INITIAL_ELO: f64 = 0.0;

/// Elo K-factor: the largest possible rating swing from a single pairing.
pub const ELO_K_FACTOR: f64 = 30.0;

/// Rating difference at which the favourite is expected to win 10:1.
pub const ELO_SCALE: f64 = 400.0;

/// Starting value for value-discrimination learning (even odds).
pub const INITIAL_VALUE: f64 = 0.5;

/// Base learning rate for the value and Rescorla-Wagner rules.
/// Divided by the 1-indexed iteration number, so later passes move less.
pub const BASE_LEARNING_RATE: f64 = 0.025;

/// Lower bound for probabilities fed into ratios and logarithms.
pub const PROBABILITY_FLOOR: f64 = 0.0001;

/// Upper bound for probabilities fed into ratios and logarithms.
pub const PROBABILITY_CEILING: f64 = 0.9999;

/// Consecutive reshuffles `norepeateven` tries before accepting a group
/// that repeats an already-used pair.
pub const MAX_PAIR_RETRIES: usize = 20;

/// Share of a `semirandom` design drawn with the `even` strategy.
pub const SEMIRANDOM_EVEN_FRACTION: f64 = 0.5;

/// Default number of passes over the pairings for the iterative methods.
/// 100 is enough for the value and Rescorla-Wagner rates to settle.
pub const DEFAULT_ITERATIONS: usize = 100;

/// Default number of items shown per trial.
pub const DEFAULT_ITEMS_PER_TRIAL: usize = 4;

/// Trials generated per item when the caller does not choose N.
/// Gains beyond 8 per item are marginal for K = 4.
pub const DEFAULT_TRIALS_PER_ITEM: usize = 8;
