/// Environment simulator.
///
/// Produces the next rainfall / water-level reading for a source as a
/// bounded uniform perturbation of the current one. Unset readings are
/// treated as 0. Results are clamped to be non-negative and rounded to one
/// decimal, matching the precision the rest of the pipeline works in.
///
/// # RNG injection
/// All functions accept an `&mut impl Rng` rather than constructing their
/// own RNG. The scheduler owns the RNG; tests pass a seeded `StdRng` so
/// simulated readings are fully deterministic.

use rand::Rng;

/// Per-cycle rainfall drift, in millimetres.
pub const RAINFALL_DRIFT_MM: (f64, f64) = (-5.0, 10.0);

/// Per-cycle water-level drift, in metres.
pub const WATER_LEVEL_DRIFT_M: (f64, f64) = (-3.0, 6.0);

/// Next rainfall reading: `max(0, round(current + uniform(-5, 10), 1))`.
pub fn simulate_rainfall<R: Rng>(current: Option<f64>, rng: &mut R) -> f64 {
    perturb(current.unwrap_or(0.0), RAINFALL_DRIFT_MM, rng)
}

/// Next water-level reading: `max(0, round(current + uniform(-3, 6), 1))`.
pub fn simulate_water_level<R: Rng>(current: Option<f64>, rng: &mut R) -> f64 {
    perturb(current.unwrap_or(0.0), WATER_LEVEL_DRIFT_M, rng)
}

fn perturb<R: Rng>(current: f64, range: (f64, f64), rng: &mut R) -> f64 {
    let change = rng.gen_range(range.0..=range.1);
    round1(current + change).max(0.0)
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rainfall_stays_within_drift_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let next = simulate_rainfall(Some(100.0), &mut rng);
            assert!(
                (95.0..=110.0).contains(&next),
                "rainfall drift must stay within [-5, +10] of current, got {}",
                next
            );
        }
    }

    #[test]
    fn test_water_level_stays_within_drift_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let next = simulate_water_level(Some(50.0), &mut rng);
            assert!(
                (47.0..=56.0).contains(&next),
                "water level drift must stay within [-3, +6] of current, got {}",
                next
            );
        }
    }

    #[test]
    fn test_readings_never_go_negative() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(simulate_rainfall(Some(0.0), &mut rng) >= 0.0);
            assert!(simulate_water_level(Some(0.5), &mut rng) >= 0.0);
        }
    }

    #[test]
    fn test_unset_reading_treated_as_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let next = simulate_rainfall(None, &mut rng);
        assert!(
            (0.0..=10.0).contains(&next),
            "with no prior reading the base is 0, so the result is in [0, 10], got {}",
            next
        );
    }

    #[test]
    fn test_results_are_rounded_to_one_decimal() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let next = simulate_rainfall(Some(20.0), &mut rng);
            assert_eq!(next, round1(next), "reading {} should carry 1dp precision", next);
        }
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        assert_eq!(
            simulate_rainfall(Some(12.0), &mut a),
            simulate_rainfall(Some(12.0), &mut b)
        );
    }
}
