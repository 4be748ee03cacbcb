//! Simulated raters: judge generated groups from known latent values.
//!
//! Useful for checking how well each scoring method recovers a known order.
use std::collections::HashMap;

use rand::Rng;

use crate::error::{BwsError, Result};
use crate::types::{Item, Trial};

/// Judge every group by latent value plus `N(0, noise_sd)` noise.
///
/// The highest perturbed value is picked best, the lowest worst, and the
/// rest keep their perturbed order as the unchosen middle. Ties keep the
/// group's presentation order. With `noise_sd == 0` the rng is never drawn
/// from.
pub fn simulate_judgments<R: Rng + ?Sized>(
    groups: &[Vec<Item>],
    latent_values: &HashMap<Item, f64>,
    noise_sd: f64,
    rng: &mut R,
) -> Result<Vec<Trial>> {
    if !noise_sd.is_finite() || noise_sd < 0.0 {
        return Err(BwsError::InvalidNoise(noise_sd));
    }

    let mut trials = Vec::with_capacity(groups.len());
    for (i, group) in groups.iter().enumerate() {
        if group.len() < 2 {
            return Err(BwsError::MalformedTrial {
                row: i + 1,
                reason: format!("a group needs at least 2 items, found {}", group.len()),
            });
        }

        let mut judged: Vec<(&Item, f64)> = Vec::with_capacity(group.len());
        for item in group {
            let latent = *latent_values
                .get(item)
                .ok_or_else(|| BwsError::UnknownItem(item.clone()))?;
            let noise = if noise_sd > 0.0 { noise_sd * standard_normal(rng) } else { 0.0 };
            judged.push((item, latent + noise));
        }
        judged.sort_by(|a, b| b.1.total_cmp(&a.1));

        let best = judged[0].0.clone();
        let worst = judged[judged.len() - 1].0.clone();
        let others = judged[1..judged.len() - 1]
            .iter()
            .map(|(item, _)| (*item).clone())
            .collect();
        let trial = Trial::new(best, worst, others).map_err(|err| match err {
            BwsError::InvalidTrial(reason) => BwsError::MalformedTrial { row: i + 1, reason },
            other => other,
        })?;
        trials.push(trial);
    }

    Ok(trials)
}

/// Box-Muller draw from N(0, 1).
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn latent(pairs: &[(&str, f64)]) -> HashMap<Item, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn group(items: &[&str]) -> Vec<Item> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_noiseless_judgment_follows_latent_order() {
        let values = latent(&[("a", 0.9), ("b", 0.1), ("c", 0.5), ("d", 0.7)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let trials = simulate_judgments(&[group(&["b", "c", "a", "d"])], &values, 0.0, &mut rng).unwrap();

        assert_eq!(trials.len(), 1);
        assert_eq!(trials[0].best, "a");
        assert_eq!(trials[0].worst, "b");
        assert_eq!(trials[0].others, group(&["d", "c"]));
    }

    #[test]
    fn test_ties_keep_presentation_order() {
        let values = latent(&[("x", 1.0), ("y", 1.0), ("z", 1.0)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let trials = simulate_judgments(&[group(&["y", "z", "x"])], &values, 0.0, &mut rng).unwrap();
        assert_eq!(trials[0].best, "y");
        assert_eq!(trials[0].worst, "x");
        assert_eq!(trials[0].others, group(&["z"]));
    }

    #[test]
    fn test_unknown_item() {
        let values = latent(&[("a", 1.0)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let err = simulate_judgments(&[group(&["a", "ghost"])], &values, 0.0, &mut rng).unwrap_err();
        assert_eq!(err, BwsError::UnknownItem("ghost".into()));
    }

    #[test]
    fn test_group_repeating_an_item_is_malformed() {
        let values = latent(&[("a", 1.0), ("b", 0.0), ("c", 0.5)]);
        let mut rng = SmallRng::seed_from_u64(0);
        let groups = [group(&["a", "b", "c"]), group(&["a", "b", "a"])];
        let err = simulate_judgments(&groups, &values, 0.0, &mut rng).unwrap_err();
        assert!(matches!(err, BwsError::MalformedTrial { row: 2, .. }), "{err:?}");
    }

    #[test]
    fn test_invalid_noise() {
        let values = latent(&[("a", 1.0), ("b", 0.0)]);
        let mut rng = SmallRng::seed_from_u64(0);
        for noise in [-0.1, f64::NAN, f64::INFINITY] {
            let err = simulate_judgments(&[group(&["a", "b"])], &values, noise, &mut rng).unwrap_err();
            assert!(matches!(err, BwsError::InvalidNoise(_)));
        }
    }

    #[test]
    fn test_noise_is_reproducible_and_perturbs_close_items() {
        let values = latent(&[("a", 0.01), ("b", 0.0), ("c", -0.01), ("d", -0.02)]);
        let groups: Vec<Vec<Item>> = (0..200).map(|_| group(&["a", "b", "c", "d"])).collect();

        let first = simulate_judgments(&groups, &values, 1.0, &mut SmallRng::seed_from_u64(9)).unwrap();
        let second = simulate_judgments(&groups, &values, 1.0, &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(first, second);

        // With noise far above the latent gaps, "a" cannot win every time.
        let a_best = first.iter().filter(|t| t.best == "a").count();
        assert!(a_best > 0 && a_best < groups.len(), "a best {a_best} times");
    }

    #[test]
    fn test_small_noise_keeps_well_separated_order() {
        let values = latent(&[("a", 100.0), ("b", 50.0), ("c", 0.0)]);
        let groups: Vec<Vec<Item>> = (0..50).map(|_| group(&["c", "a", "b"])).collect();
        let trials = simulate_judgments(&groups, &values, 0.5, &mut SmallRng::seed_from_u64(2)).unwrap();
        for trial in trials {
            assert_eq!((trial.best.as_str(), trial.worst.as_str()), ("a", "c"));
        }
    }
}
