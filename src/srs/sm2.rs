//! SM-2 scheduling.
//!
//! Update rules:
//! 1. review_count' = review_count + 1
//! 2. grade < 3: interval' = 1, status' = Learning
//! 3. grade >= 3: interval' = 1, then 6, then round(interval × ease),
//!    clamped to [1, maximum_interval_days]
//! 4. ease' = max(floor, ease + 0.1 - (5 - g) × (0.08 + (5 - g) × 0.02))
//! 5. On success the status is Mastered when interval' × ease' exceeds the
//!    mastery threshold, Review once interval' reaches the graduation
//!    interval, Learning otherwise
//! 6. next_review_at' = now + interval' days

use chrono::{DateTime, Duration, Utc};

use crate::config::SrsConfig;
use crate::core::{Grade, LearningStatus, RetentionState};
use crate::srs::SrsStrategy;

/// Interval after the first successful review.
const FIRST_INTERVAL_DAYS: u32 = 1;

/// Interval after the second successful review.
const SECOND_INTERVAL_DAYS: u32 = 6;

/// Interval after a failed review.
const RELEARN_INTERVAL_DAYS: u32 = 1;

/// The SM-2 algorithm with configurable thresholds.
#[derive(Debug, Clone, Default)]
pub struct Sm2Strategy {
    config: SrsConfig,
}

impl Sm2Strategy {
    pub fn new(config: SrsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SrsConfig {
        &self.config
    }

    fn next_interval(&self, previous: Option<u32>, ease: f64, reviews: u32) -> u32 {
        let raw = match reviews {
            1 => FIRST_INTERVAL_DAYS,
            2 => SECOND_INTERVAL_DAYS,
            _ => {
                let scaled = (f64::from(previous.unwrap_or(1)) * ease).round();
                if scaled >= f64::from(u32::MAX) {
                    u32::MAX
                } else {
                    scaled as u32
                }
            }
        };
        raw.min(self.config.maximum_interval_days).max(1)
    }

    fn status_after_success(&self, interval: u32, ease: f64) -> LearningStatus {
        if f64::from(interval) * ease > self.config.mastery_threshold {
            LearningStatus::Mastered
        } else if interval >= self.config.graduation_interval_days {
            LearningStatus::Review
        } else {
            LearningStatus::Learning
        }
    }
}

/// SM-2 ease adjustment for a grade.
///
/// +0.10 for 5, 0 for 4, then increasingly negative.
pub fn ease_delta(grade: Grade) -> f64 {
    let miss = f64::from(Grade::MAX - grade.value());
    0.1 - miss * (0.08 + miss * 0.02)
}

impl SrsStrategy for Sm2Strategy {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn compute(&self, state: &RetentionState, grade: Grade, now: DateTime<Utc>) -> RetentionState {
        let reviews = state.reviews().saturating_add(1);
        let ease = state
            .ease_factor
            .unwrap_or(self.config.default_ease)
            .max(self.config.ease_floor);
        let next_ease = (ease + ease_delta(grade)).max(self.config.ease_floor);

        let (interval, status) = if grade.is_passing() {
            let interval = self.next_interval(state.interval, ease, reviews);
            (interval, self.status_after_success(interval, next_ease))
        } else {
            (RELEARN_INTERVAL_DAYS, LearningStatus::Learning)
        };

        let next_review_at = now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        RetentionState {
            learning_status: status,
            interval: Some(interval),
            ease_factor: Some(next_ease),
            review_count: Some(reviews),
            next_review_at: Some(next_review_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn grade(g: i64) -> Grade {
        Grade::new(g).unwrap()
    }

    fn state(
        status: LearningStatus,
        interval: Option<u32>,
        ease: f64,
        count: Option<u32>,
    ) -> RetentionState {
        RetentionState {
            learning_status: status,
            interval,
            ease_factor: Some(ease),
            review_count: count,
            next_review_at: count.map(|_| t0()),
        }
    }

    fn sm2() -> Sm2Strategy {
        Sm2Strategy::new(SrsConfig::default())
    }

    #[test]
    fn test_ease_delta_table() {
        let expected = [(5, 0.10), (4, 0.0), (3, -0.14), (2, -0.32), (1, -0.54)];
        for (g, delta) in expected {
            assert!(
                (ease_delta(grade(g)) - delta).abs() < 1e-9,
                "grade {} delta {}",
                g,
                ease_delta(grade(g))
            );
        }
    }

    #[test]
    fn test_first_review_of_new_item() {
        let next = sm2().compute(&RetentionState::new_item(), grade(4), t0());

        assert_eq!(next.interval, Some(1));
        assert_eq!(next.review_count, Some(1));
        assert_eq!(next.learning_status, LearningStatus::Learning);
        assert_eq!(next.next_review_at, Some(t0() + Duration::days(1)));
        assert!((next.ease_factor.unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_second_success_graduates_to_review() {
        let before = state(LearningStatus::Learning, Some(1), 2.5, Some(1));
        let next = sm2().compute(&before, grade(4), t0());

        assert_eq!(next.interval, Some(6));
        assert_eq!(next.review_count, Some(2));
        assert_eq!(next.learning_status, LearningStatus::Review);
        assert_eq!(next.next_review_at, Some(t0() + Duration::days(6)));
    }

    #[test]
    fn test_long_interval_reaches_mastered() {
        let before = state(LearningStatus::Review, Some(15), 2.5, Some(5));
        let next = sm2().compute(&before, grade(5), t0());

        // 15 × 2.5 = 37.5 rounds to 38
        assert_eq!(next.interval, Some(38));
        assert_eq!(next.review_count, Some(6));
        assert!((next.ease_factor.unwrap() - 2.6).abs() < 1e-9);
        assert_eq!(next.learning_status, LearningStatus::Mastered);
    }

    #[test]
    fn test_failure_resets_interval() {
        let before = state(LearningStatus::Learning, Some(6), 2.5, Some(3));
        let next = sm2().compute(&before, grade(1), t0());

        assert_eq!(next.interval, Some(1));
        assert_eq!(next.review_count, Some(4));
        assert!(next.ease_factor.unwrap() < 2.5);
        assert!((next.ease_factor.unwrap() - 1.96).abs() < 1e-9);
        assert_eq!(next.learning_status, LearningStatus::Learning);
    }

    #[test]
    fn test_failure_demotes_mastered() {
        let before = state(LearningStatus::Mastered, Some(90), 2.8, Some(9));
        let next = sm2().compute(&before, grade(2), t0());
        assert_eq!(next.learning_status, LearningStatus::Learning);
        assert_eq!(next.interval, Some(1));
    }

    #[test]
    fn test_ease_never_drops_below_floor() {
        let before = state(LearningStatus::Learning, Some(1), 1.3, Some(4));
        let next = sm2().compute(&before, grade(1), t0());
        assert!((next.ease_factor.unwrap() - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_interval_capped_at_maximum() {
        let strategy = Sm2Strategy::new(SrsConfig {
            maximum_interval_days: 100,
            ..SrsConfig::default()
        });
        let before = state(LearningStatus::Mastered, Some(80), 2.5, Some(8));
        let next = strategy.compute(&before, grade(5), t0());
        assert_eq!(next.interval, Some(100));
    }

    #[test]
    fn test_missing_interval_treated_as_one() {
        // Third review with a legacy row that lost its interval.
        let before = RetentionState {
            learning_status: LearningStatus::Review,
            interval: None,
            ease_factor: Some(2.5),
            review_count: Some(2),
            next_review_at: Some(t0()),
        };
        let next = sm2().compute(&before, grade(4), t0());
        // round(1 × 2.5) = 3
        assert_eq!(next.interval, Some(3));
    }

    #[test]
    fn test_missing_ease_uses_default() {
        let before = RetentionState {
            ease_factor: None,
            ..RetentionState::new_item()
        };
        let next = sm2().compute(&before, grade(5), t0());
        assert!((next.ease_factor.unwrap() - 2.6).abs() < 1e-9);
    }

    #[test]
    fn test_configured_thresholds_move_status_boundaries() {
        let strict = Sm2Strategy::new(SrsConfig {
            graduation_interval_days: 7,
            mastery_threshold: 200.0,
            ..SrsConfig::default()
        });
        let before = state(LearningStatus::Learning, Some(1), 2.5, Some(1));
        assert_eq!(
            strict.compute(&before, grade(4), t0()).learning_status,
            LearningStatus::Learning
        );

        let before = state(LearningStatus::Review, Some(15), 2.5, Some(5));
        assert_eq!(
            strict.compute(&before, grade(5), t0()).learning_status,
            LearningStatus::Review
        );
    }

    #[test]
    fn test_compute_is_deterministic() {
        let before = state(LearningStatus::Review, Some(10), 2.2, Some(4));
        let a = sm2().compute(&before, grade(3), t0());
        let b = sm2().compute(&before, grade(3), t0());
        assert_eq!(a, b);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_status() -> impl Strategy<Value = LearningStatus> {
            prop_oneof![
                Just(LearningStatus::New),
                Just(LearningStatus::Learning),
                Just(LearningStatus::Review),
                Just(LearningStatus::Mastered),
            ]
        }

        fn arb_state() -> impl Strategy<Value = RetentionState> {
            (
                arb_status(),
                proptest::option::of(1u32..=36_500),
                1.3f64..=4.0,
                proptest::option::of(0u32..=500),
            )
                .prop_map(|(status, interval, ease, count)| RetentionState {
                    learning_status: status,
                    interval,
                    ease_factor: Some(ease),
                    review_count: count,
                    next_review_at: count.map(|_| t0()),
                })
        }

        fn arb_grade() -> impl Strategy<Value = Grade> {
            (1i64..=5).prop_map(|g| Grade::new(g).unwrap())
        }

        proptest! {
            #[test]
            fn review_count_increments_by_one(state in arb_state(), g in arb_grade()) {
                let next = sm2().compute(&state, g, t0());
                prop_assert_eq!(next.reviews(), state.reviews() + 1);
            }

            #[test]
            fn failure_resets_interval_without_raising_ease(
                state in arb_state(),
                g in 1i64..=2,
            ) {
                let next = sm2().compute(&state, grade(g), t0());
                prop_assert_eq!(next.interval, Some(1));
                prop_assert!(next.ease_factor.unwrap() <= state.ease_factor.unwrap() + 1e-9);
                prop_assert_eq!(next.learning_status, LearningStatus::Learning);
            }

            #[test]
            fn result_satisfies_invariants(state in arb_state(), g in arb_grade()) {
                let config = SrsConfig::default();
                let next = sm2().compute(&state, g, t0());
                prop_assert!(next.check_invariants(config.ease_floor).is_ok());
                prop_assert!(next.interval.unwrap() >= 1);
                prop_assert!(next.interval.unwrap() <= config.maximum_interval_days);
                prop_assert!(next.next_review_at.unwrap() > t0());
                prop_assert!(next.learning_status != LearningStatus::New);
            }

            #[test]
            fn next_review_is_interval_days_ahead(state in arb_state(), g in arb_grade()) {
                let next = sm2().compute(&state, g, t0());
                let days = i64::from(next.interval.unwrap());
                prop_assert_eq!(next.next_review_at, Some(t0() + Duration::days(days)));
            }
        }
    }
}
