use shared::{Standing, StandingProgress};

use crate::config::StandingThresholds;

/// Fraction of `span` covered by `done`, clamped to [0, 1].
/// An empty span counts as complete.
fn fraction(done: i64, span: i64) -> f64 {
    if span <= 0 {
        return 1.0;
    }
    (done as f64 / span as f64).clamp(0.0, 1.0)
}

/// Map a lifetime completed-sprint count to a standing tier
pub fn calculate_standing(total_completed: i64, thresholds: StandingThresholds) -> StandingProgress {
    let StandingThresholds { silver, gold } = thresholds;

    if total_completed < silver {
        StandingProgress {
            standing: Standing::Bronze,
            next_threshold: Some(silver),
            percent_to_next: fraction(total_completed, silver),
        }
    } else if total_completed < gold {
        StandingProgress {
            standing: Standing::Silver,
            next_threshold: Some(gold),
            percent_to_next: fraction(total_completed - silver, gold - silver),
        }
    } else {
        StandingProgress {
            standing: Standing::Gold,
            next_threshold: None,
            percent_to_next: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: StandingThresholds = StandingThresholds { silver: 20, gold: 50 };

    #[test]
    fn test_zero_completed() {
        let result = calculate_standing(0, THRESHOLDS);
        assert_eq!(result.standing, Standing::Bronze);
        assert_eq!(result.next_threshold, Some(20));
        assert_eq!(result.percent_to_next, 0.0);
    }

    #[test]
    fn test_silver_mid_tier() {
        let result = calculate_standing(25, THRESHOLDS);
        assert_eq!(result.standing, Standing::Silver);
        assert_eq!(result.next_threshold, Some(50));
        assert!((result.percent_to_next - 5.0 / 30.0).abs() < 1e-9);
        assert!((result.percent_to_next - 0.1667).abs() < 1e-4);
    }

    #[test]
    fn test_silver_boundary() {
        let below = calculate_standing(19, THRESHOLDS);
        assert_eq!(below.standing, Standing::Bronze);
        assert!((below.percent_to_next - 0.95).abs() < 1e-9);
        assert!(below.percent_to_next < 1.0);

        let at = calculate_standing(20, THRESHOLDS);
        assert_eq!(at.standing, Standing::Silver);
        assert_eq!(at.percent_to_next, 0.0);
    }

    #[test]
    fn test_gold_boundary() {
        let below = calculate_standing(49, THRESHOLDS);
        assert_eq!(below.standing, Standing::Silver);
        assert!(below.percent_to_next < 1.0);

        let at = calculate_standing(50, THRESHOLDS);
        assert_eq!(at.standing, Standing::Gold);
        assert_eq!(at.next_threshold, None);
        assert_eq!(at.percent_to_next, 1.0);

        let far = calculate_standing(10_000, THRESHOLDS);
        assert_eq!(far.standing, Standing::Gold);
        assert_eq!(far.percent_to_next, 1.0);
    }

    #[test]
    fn test_monotonic() {
        let mut previous = calculate_standing(0, THRESHOLDS);
        for total in 1..=120 {
            let current = calculate_standing(total, THRESHOLDS);
            assert!(current.standing >= previous.standing, "tier dropped at {}", total);
            if current.standing == previous.standing {
                assert!(
                    current.percent_to_next >= previous.percent_to_next,
                    "percent dropped at {}",
                    total
                );
            }
            assert!((0.0..=1.0).contains(&current.percent_to_next));
            previous = current;
        }
    }

    #[test]
    fn test_zero_thresholds() {
        let result = calculate_standing(0, StandingThresholds { silver: 0, gold: 0 });
        assert_eq!(result.standing, Standing::Gold);
        assert_eq!(result.percent_to_next, 1.0);

        // Silver reachable immediately, gold still ahead
        let result = calculate_standing(0, StandingThresholds { silver: 0, gold: 10 });
        assert_eq!(result.standing, Standing::Silver);
        assert_eq!(result.percent_to_next, 0.0);
    }

    #[test]
    fn test_equal_thresholds_skip_silver() {
        let thresholds = StandingThresholds { silver: 30, gold: 30 };
        assert_eq!(calculate_standing(29, thresholds).standing, Standing::Bronze);
        assert_eq!(calculate_standing(30, thresholds).standing, Standing::Gold);
    }
}
