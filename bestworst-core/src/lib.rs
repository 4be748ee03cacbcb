/// bestworst-core: Best-worst scaling, from trial design to item scores.
///
/// Generate groups of K items, collect which one a rater picked best and
/// which worst, then turn those judgments into per-item scores under a dozen
/// or so counting and iterative methods. No IO, no filesystem. Spreadsheets
/// and CLIs live elsewhere.
///
/// Items are identified by their string labels. The crate interns them into
/// array keys internally; callers never see the keys.
///
/// # Quick start
///
/// ```rust
/// use bestworst_core::{score_trials, Method, ScoringOptions, Trial};
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
///
/// let trials = vec![
///     Trial::new("apple", "durian", vec!["banana".into(), "cherry".into()]).unwrap(),
///     Trial::new("banana", "durian", vec!["cherry".into(), "elderberry".into()]).unwrap(),
///     Trial::new("apple", "elderberry", vec!["cherry".into(), "durian".into()]).unwrap(),
/// ];
///
/// let mut rng = SmallRng::seed_from_u64(42);
/// let table = score_trials(&trials, &ScoringOptions::default(), &mut rng).unwrap();
///
/// for row in table.ranked_by(Method::Value).unwrap() {
///     println!("{}: {:?}", row.item, row.scores);
/// }
/// ```

pub mod aggregate;
pub mod compliance;
pub mod constants;
pub mod engine;
pub mod entry;
pub mod error;
pub mod numeric;
pub mod pairings;
pub mod parse;
pub mod scoring;
pub mod simulate;
pub mod trialgen;
pub mod types;

// Re-export primary public API at crate root.
pub use compliance::{assess_compliance, retain_compliant, ParticipantCompliance};
pub use engine::ScoringRun;
pub use entry::ItemEntry;
pub use error::{BwsError, Result};
pub use pairings::compile_pairings;
pub use parse::{parse_trial_row, parse_trials, ColumnLayout, TrialColumns};
pub use scoring::{score_trials, Method, ScoreTable, ScoredItem, ScoringOptions};
pub use simulate::simulate_judgments;
pub use trialgen::{generate_trials, Strategy};
pub use types::{Entrant, Item, Pairing, Trial};
