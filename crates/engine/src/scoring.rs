//! Soft scoring of a proposed assignment.
//!
//! Rules are evaluated in a fixed order and each one adds to the running
//! score. A failed legality check short-circuits with [`ILLEGAL_SCORE`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::constraints::check_hard_constraints;
use crate::model::{days_before, is_weekend, Employee};
use crate::shift::ShiftToken;

/// Score of an assignment that breaks a hard rule. Any legal score is
/// strictly greater.
pub const ILLEGAL_SCORE: i32 = -10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: i32,
    pub reasons: Vec<String>,
}

impl ScoreResult {
    pub fn is_legal(&self) -> bool {
        self.score > ILLEGAL_SCORE
    }
}

/// Hours context for the balancing rule: the candidate's accumulated hours
/// and the roster-wide average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Workload {
    pub employee_hours: f64,
    pub average_hours: f64,
}

impl Workload {
    /// Derive the workload of `employee` from the full roster.
    pub fn from_roster(employee: &Employee, all_employees: &[Employee]) -> Self {
        Workload {
            employee_hours: employee.total_hours(),
            average_hours: roster_average_hours(all_employees),
        }
    }
}

/// All-time hours across the roster divided by head-count. Zero for an
/// empty roster.
pub fn roster_average_hours(employees: &[Employee]) -> f64 {
    if employees.is_empty() {
        return 0.0;
    }
    let total: f64 = employees.iter().map(Employee::total_hours).sum();
    total / employees.len() as f64
}

/// Score `proposed` for `employee` on `date` given a precomputed workload.
pub fn calculate_score(
    employee: &Employee,
    date: NaiveDate,
    proposed: ShiftToken,
    workload: &Workload,
    config: &SchedulerConfig,
) -> ScoreResult {
    let check = check_hard_constraints(employee, date, proposed, config);
    if !check.valid {
        return ScoreResult {
            score: ILLEGAL_SCORE,
            reasons: check.reason.into_iter().collect(),
        };
    }

    let weights = &config.weights;
    let working = !proposed.is_day_off();
    let mut score = 0;
    let mut reasons = Vec::new();

    let night_before = |n: i64| {
        days_before(date, n).is_some_and(|day| employee.worked_night_on(day))
    };

    // Two nights in a row call for a recovery day.
    let recovering = night_before(1) && night_before(2);
    if recovering {
        if working {
            score -= weights.night_recovery_penalty;
            reasons.push("needs recovery after two consecutive nights".to_string());
        } else {
            score += weights.night_recovery_bonus;
            reasons.push("recovery day after two consecutive nights".to_string());
        }
    }

    if night_before(1) && working {
        score -= weights.post_night_penalty;
        reasons.push("worked a night shift yesterday".to_string());
    }

    if is_weekend(date) {
        let worked_last_weekend =
            days_before(date, 7).is_some_and(|day| employee.worked_on(day));
        if worked_last_weekend {
            if working {
                score -= weights.weekend_penalty;
                reasons.push("worked the previous weekend".to_string());
            } else {
                score += weights.weekend_bonus;
                reasons.push("weekend off after working the previous one".to_string());
            }
        }
    }

    if working {
        let margin = f64::from(config.balance_margin_hours);
        let delta = workload.employee_hours - workload.average_hours;
        if delta < -margin {
            score += weights.under_average_bonus;
            reasons.push(format!("{:.0}h below roster average", -delta));
        } else if delta > margin {
            score -= weights.over_average_penalty;
            reasons.push(format!("{:.0}h above roster average", delta));
        }
    }

    if working {
        let streak = consecutive_days_worked(employee, date, config.fatigue_lookback_days);
        if streak >= config.fatigue_streak_days {
            score -= weights.fatigue_penalty;
            reasons.push(format!("{} consecutive working days", streak));
        }
    }

    ScoreResult { score, reasons }
}

/// Convenience form that derives the workload from `all_employees` on every
/// call. Prefer [`calculate_score`] inside loops.
pub fn calculate_score_for_roster(
    employee: &Employee,
    date: NaiveDate,
    proposed: ShiftToken,
    all_employees: &[Employee],
    config: &SchedulerConfig,
) -> ScoreResult {
    let workload = Workload::from_roster(employee, all_employees);
    calculate_score(employee, date, proposed, &workload, config)
}

/// Working days immediately before `date`, looking back at most `lookback`
/// days.
pub fn consecutive_days_worked(employee: &Employee, date: NaiveDate, lookback: u32) -> u32 {
    let mut streak = 0;
    for back in 1..=i64::from(lookback) {
        match days_before(date, back) {
            Some(day) if employee.worked_on(day) => streak += 1,
            _ => break,
        }
    }
    streak
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
