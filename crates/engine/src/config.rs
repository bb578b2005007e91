use serde::{Deserialize, Serialize};

use crate::scoring::ILLEGAL_SCORE;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("'{0}' must be greater than zero")]
    NotPositive(&'static str),
    #[error("'{strong}' ({strong_value}) must outweigh '{weak}' ({weak_value})")]
    WeightOrder {
        strong: &'static str,
        strong_value: i32,
        weak: &'static str,
        weak_value: i32,
    },
    #[error("'{0}' must not be negative")]
    Negative(&'static str),
    #[error("fatigue lookback ({lookback} days) is shorter than the streak it must detect ({streak} days)")]
    LookbackTooShort { lookback: u32, streak: u32 },
    #[error("combined penalties ({0}) reach the illegal-assignment sentinel")]
    PenaltiesTooLarge(i64),
}

// ---------------------------------------------------------------------------
// Score weights
// ---------------------------------------------------------------------------

/// Magnitudes of the soft rules. Penalties are stored as positive numbers and
/// subtracted by the scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreWeights {
    /// Working after two consecutive nights.
    pub night_recovery_penalty: i32,
    /// Resting after two consecutive nights.
    pub night_recovery_bonus: i32,
    /// Working the day after a night.
    pub post_night_penalty: i32,
    pub weekend_penalty: i32,
    pub weekend_bonus: i32,
    pub under_average_bonus: i32,
    pub over_average_penalty: i32,
    /// Working after a long run of consecutive days.
    pub fatigue_penalty: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            night_recovery_penalty: 100,
            night_recovery_bonus: 50,
            post_night_penalty: 40,
            weekend_penalty: 20,
            weekend_bonus: 20,
            under_average_bonus: 15,
            over_average_penalty: 15,
            fatigue_penalty: 80,
        }
    }
}

impl ScoreWeights {
    fn named(&self) -> [(&'static str, i32); 8] {
        [
            ("nightRecoveryPenalty", self.night_recovery_penalty),
            ("nightRecoveryBonus", self.night_recovery_bonus),
            ("postNightPenalty", self.post_night_penalty),
            ("weekendPenalty", self.weekend_penalty),
            ("weekendBonus", self.weekend_bonus),
            ("underAverageBonus", self.under_average_bonus),
            ("overAveragePenalty", self.over_average_penalty),
            ("fatiguePenalty", self.fatigue_penalty),
        ]
    }

    /// Recovery and fatigue must dominate every ordinary nudge, and the
    /// post-night penalty must stay softer than night recovery.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.named() {
            if value < 0 {
                return Err(ConfigError::Negative(name));
            }
        }

        let strong = [
            ("nightRecoveryPenalty", self.night_recovery_penalty),
            ("fatiguePenalty", self.fatigue_penalty),
        ];
        let weak = [
            ("postNightPenalty", self.post_night_penalty),
            ("weekendPenalty", self.weekend_penalty),
            ("overAveragePenalty", self.over_average_penalty),
        ];
        for (strong_name, strong_value) in strong {
            for (weak_name, weak_value) in weak {
                if strong_value <= weak_value {
                    return Err(ConfigError::WeightOrder {
                        strong: strong_name,
                        strong_value,
                        weak: weak_name,
                        weak_value,
                    });
                }
            }
        }

        let total: i64 = [
            self.night_recovery_penalty,
            self.post_night_penalty,
            self.weekend_penalty,
            self.over_average_penalty,
            self.fatigue_penalty,
        ]
        .iter()
        .map(|&v| i64::from(v))
        .sum();
        if -total <= i64::from(ILLEGAL_SCORE) {
            return Err(ConfigError::PenaltiesTooLarge(total));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scheduler configuration
// ---------------------------------------------------------------------------

/// Thresholds and weights shared by the checker, the scorer, the assignor and
/// the validator. Every field falls back to its default when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    /// Minimum rest between two consecutive shifts.
    pub min_rest_hours: i32,
    /// Dead band around the roster average before balancing kicks in.
    pub balance_margin_hours: u32,
    /// Consecutive worked days that trigger the fatigue penalty.
    pub fatigue_streak_days: u32,
    /// How far back the fatigue scan looks.
    pub fatigue_lookback_days: u32,
    /// Longest rest every calendar week must contain (validator only).
    pub weekly_rest_hours: u32,
    /// Longest allowed run of working days (validator only).
    pub max_consecutive_days: u32,
    pub weights: ScoreWeights,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            min_rest_hours: 11,
            balance_margin_hours: 10,
            fatigue_streak_days: 5,
            fatigue_lookback_days: 6,
            weekly_rest_hours: 35,
            max_consecutive_days: 6,
            weights: ScoreWeights::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_rest_hours <= 0 {
            return Err(ConfigError::NotPositive("minRestHours"));
        }
        if self.fatigue_streak_days == 0 {
            return Err(ConfigError::NotPositive("fatigueStreakDays"));
        }
        if self.fatigue_lookback_days < self.fatigue_streak_days {
            return Err(ConfigError::LookbackTooShort {
                lookback: self.fatigue_lookback_days,
                streak: self.fatigue_streak_days,
            });
        }
        if self.weekly_rest_hours == 0 {
            return Err(ConfigError::NotPositive("weeklyRestHours"));
        }
        if self.max_consecutive_days == 0 {
            return Err(ConfigError::NotPositive("maxConsecutiveDays"));
        }
        self.weights.validate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(SchedulerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: SchedulerConfig =
            serde_json::from_str(r#"{"minRestHours": 12, "weights": {"weekendBonus": 5}}"#)
                .unwrap();
        assert_eq!(cfg.min_rest_hours, 12);
        assert_eq!(cfg.balance_margin_hours, 10);
        assert_eq!(cfg.weights.weekend_bonus, 5);
        assert_eq!(cfg.weights.fatigue_penalty, 80);
    }

    #[test]
    fn test_fatigue_must_outweigh_balancing() {
        let mut cfg = SchedulerConfig::default();
        cfg.weights.fatigue_penalty = 10;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WeightOrder {
                strong: "fatiguePenalty",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_non_positive_rest() {
        let cfg = SchedulerConfig {
            min_rest_hours: 0,
            ..SchedulerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NotPositive("minRestHours")));
    }

    #[test]
    fn test_rejects_penalties_reaching_sentinel() {
        let mut cfg = SchedulerConfig::default();
        cfg.weights.night_recovery_penalty = 9_000;
        cfg.weights.fatigue_penalty = 9_000;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::PenaltiesTooLarge(_))
        ));
    }
}
