use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::model::{days_before, Employee};
use crate::shift::{HourRange, ShiftToken};

/// Outcome of the hard legality check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ConstraintCheck {
    pub fn ok() -> Self {
        ConstraintCheck {
            valid: true,
            reason: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        ConstraintCheck {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Hours between the end of `previous` (worked the day before) and the start
/// of `next`. A window with `start >= end` ends on the target day.
pub fn rest_gap(previous: HourRange, next_start: u8) -> i32 {
    let prev_end = i32::from(previous.end);
    let next_start = i32::from(next_start);
    if previous.crosses_midnight() {
        // Previous shift already ended on the target day.
        next_start - prev_end
    } else {
        (24 - prev_end) + next_start
    }
}

/// Decide whether `employee` may legally take `proposed` on `date`.
///
/// The daily rest rule is the only one enforced here; weekly rest and
/// streak limits belong to the validator.
pub fn check_hard_constraints(
    employee: &Employee,
    date: NaiveDate,
    proposed: ShiftToken,
    config: &SchedulerConfig,
) -> ConstraintCheck {
    let Some(next) = proposed.hours() else {
        return ConstraintCheck::ok();
    };

    let previous = days_before(date, 1)
        .and_then(|prev| employee.shift_on(prev))
        .and_then(|shift| shift.window());
    let Some(previous) = previous else {
        return ConstraintCheck::ok();
    };

    let gap = rest_gap(previous, next.start);
    if gap < config.min_rest_hours {
        return ConstraintCheck::fail(format!("insufficient rest (gap {}h)", gap));
    }
    ConstraintCheck::ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Shift, ShiftKind};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn with_shift(date: &str, shift: Shift) -> Employee {
        let mut e = Employee::new("a", "A");
        e.assign(d(date), shift);
        e
    }

    fn check(e: &Employee, date: &str, token: ShiftToken) -> ConstraintCheck {
        check_hard_constraints(e, d(date), token, &SchedulerConfig::default())
    }

    #[test]
    fn test_day_off_always_valid() {
        let e = with_shift("2024-03-03", Shift::from_token(ShiftToken::Night));
        assert_eq!(check(&e, "2024-03-04", ShiftToken::DayOff), ConstraintCheck::ok());
    }

    #[test]
    fn test_no_previous_shift_is_valid() {
        let e = Employee::new("a", "A");
        assert!(check(&e, "2024-03-04", ShiftToken::Night).valid);
    }

    #[test]
    fn test_previous_without_window_is_valid() {
        let e = with_shift("2024-03-03", Shift::absence(ShiftKind::PaidLeave, None).unwrap());
        assert!(check(&e, "2024-03-04", ShiftToken::Early).valid);
        let e = with_shift("2024-03-03", Shift::day_off());
        assert!(check(&e, "2024-03-04", ShiftToken::Early).valid);
    }

    #[test]
    fn test_night_then_morning_is_rejected() {
        // 20-8 ends at 08:00 on the target day: zero rest before 8-16.
        let e = with_shift("2024-03-03", Shift::from_token(ShiftToken::Night));
        let result = check(&e, "2024-03-04", ShiftToken::Day);
        assert!(!result.valid);
        assert_eq!(result.reason.as_deref(), Some("insufficient rest (gap 0h)"));
    }

    #[test]
    fn test_night_then_night_is_allowed() {
        let e = with_shift("2024-03-03", Shift::from_token(ShiftToken::Night));
        assert!(check(&e, "2024-03-04", ShiftToken::Night).valid);
    }

    #[test]
    fn test_late_finish_then_early_start() {
        // 8-20 then 8-14: (24 - 20) + 8 = 12h.
        let e = with_shift("2024-03-03", Shift::from_token(ShiftToken::Long));
        assert!(check(&e, "2024-03-04", ShiftToken::Early).valid);

        // A late custom shift ending at 23 leaves only 9h before 08:00.
        let e = with_shift("2024-03-03", Shift::custom(ShiftKind::Work, 15, 23).unwrap());
        let result = check(&e, "2024-03-04", ShiftToken::Early);
        assert!(!result.valid);
        assert_eq!(result.reason.as_deref(), Some("insufficient rest (gap 9h)"));
    }

    #[test]
    fn test_midnight_crossing_shift_ending_at_twenty() {
        let e = with_shift("2024-03-03", Shift::custom(ShiftKind::Work, 22, 20).unwrap());
        let result = check(&e, "2024-03-04", ShiftToken::Night);
        assert_eq!(result, ConstraintCheck::fail("insufficient rest (gap 0h)"));
    }

    #[test]
    fn test_full_day_shift_leaves_no_rest() {
        // 8-8 is a 24h shift ending at 08:00 on the target day.
        let e = with_shift("2024-03-03", Shift::custom(ShiftKind::Work, 8, 8).unwrap());
        let result = check(&e, "2024-03-04", ShiftToken::Day);
        assert_eq!(result, ConstraintCheck::fail("insufficient rest (gap 0h)"));
        assert!(check(&e, "2024-03-04", ShiftToken::Night).valid);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let e = with_shift("2024-03-03", Shift::from_token(ShiftToken::Long));
        let strict = SchedulerConfig {
            min_rest_hours: 13,
            ..SchedulerConfig::default()
        };
        assert!(!check_hard_constraints(&e, d("2024-03-04"), ShiftToken::Early, &strict).valid);
    }

    #[test]
    fn test_rest_gap_formula() {
        assert_eq!(rest_gap(HourRange::new(20, 8), 20), 12);
        assert_eq!(rest_gap(HourRange::new(8, 16), 8), 16);
        assert_eq!(rest_gap(HourRange::new(14, 20), 8), 12);
        assert_eq!(rest_gap(HourRange::new(22, 6), 4), -2);
        assert_eq!(rest_gap(HourRange::new(8, 8), 8), 0);
    }
}
