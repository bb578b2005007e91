use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::constraints::rest_gap;
use crate::model::{Demand, Employee, Schedule};
use crate::scheduler::{tranche_counts, Tranche};

// ---------------------------------------------------------------------------
// Validation result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validate implementation
// ---------------------------------------------------------------------------

/// Re-derive alerts for a whole schedule month. Errors are broken records or
/// daily rest violations; warnings are weekly rest, long streaks and, when a
/// demand profile is given, understaffed tranches. Errors are listed before
/// warnings.
pub fn validate(
    schedule: &Schedule,
    demand: Option<&Demand>,
    config: &SchedulerConfig,
) -> ValidationResult {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    let days = schedule.month_days();

    if days.is_empty() {
        errors.push(format!(
            "Schedule month {}-{} is not a valid calendar month",
            schedule.year, schedule.month
        ));
        return ValidationResult { errors, warnings };
    }

    for employee in &schedule.employees {
        check_records(employee, &mut errors);
        check_daily_rest(employee, config, &mut errors);
        check_weekly_rest(employee, &days, config, &mut warnings);
        check_streaks(employee, &days, config, &mut warnings);
    }

    if let Some(demand) = demand {
        for &date in &days {
            let counts = tranche_counts(&schedule.employees, date);
            for tranche in [Tranche::Morning, Tranche::Afternoon, Tranche::Night] {
                let wanted = tranche.demanded(demand);
                let have = counts.get(tranche);
                if have < wanted {
                    warnings.push(format!(
                        "{}: {:?} understaffed -- {} of {} staffed",
                        date, tranche, have, wanted
                    ));
                }
            }
        }
    }

    ValidationResult { errors, warnings }
}

// ---------------------------------------------------------------------------
// Per-employee checks
// ---------------------------------------------------------------------------

fn check_records(employee: &Employee, errors: &mut Vec<String>) {
    for (date, shift) in &employee.shifts {
        let bad_hour = [shift.start_hour, shift.end_hour]
            .iter()
            .flatten()
            .any(|&h| h > 23);
        if bad_hour {
            errors.push(format!(
                "{} on {}: hours must be between 0 and 23",
                employee.name, date
            ));
            continue;
        }
        if shift.start_hour.is_some() != shift.end_hour.is_some() {
            errors.push(format!(
                "{} on {}: start and end hour must be set together",
                employee.name, date
            ));
            continue;
        }
        let expected = shift.expected_hours();
        if (shift.hours - expected).abs() > f64::EPSILON {
            errors.push(format!(
                "{} on {}: shift records {}h but its window is {}h",
                employee.name, date, shift.hours, expected
            ));
        }
    }
}

fn check_daily_rest(employee: &Employee, config: &SchedulerConfig, errors: &mut Vec<String>) {
    for (date, shift) in &employee.shifts {
        let Some(window) = shift.window() else {
            continue;
        };
        let previous = date
            .pred_opt()
            .and_then(|p| employee.shift_on(p))
            .and_then(|s| s.window());
        if let Some(previous) = previous {
            let gap = rest_gap(previous, window.start);
            if gap < config.min_rest_hours {
                errors.push(format!(
                    "{} on {}: insufficient rest (gap {}h, minimum {}h)",
                    employee.name, date, gap, config.min_rest_hours
                ));
            }
        }
    }
}

/// Busy intervals in hours relative to `origin` 00:00, for shifts starting on
/// `from..=to`.
fn busy_intervals(
    employee: &Employee,
    origin: NaiveDate,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<(i64, i64)> {
    let mut intervals: Vec<(i64, i64)> = employee
        .shifts
        .range(from..=to)
        .filter_map(|(date, shift)| {
            let window = shift.window()?;
            let start = (*date - origin).num_days() * 24 + i64::from(window.start);
            Some((start, start + i64::from(window.duration())))
        })
        .collect();
    intervals.sort_unstable();
    intervals
}

/// Longest uninterrupted rest inside `[0, horizon)` given sorted busy
/// intervals.
fn longest_rest(intervals: &[(i64, i64)], horizon: i64) -> i64 {
    let mut longest = 0;
    let mut free_from = 0;
    for &(start, end) in intervals {
        let start = start.clamp(0, horizon);
        let end = end.clamp(0, horizon);
        longest = longest.max(start - free_from);
        free_from = free_from.max(end);
    }
    longest.max(horizon - free_from)
}

fn check_weekly_rest(
    employee: &Employee,
    days: &[NaiveDate],
    config: &SchedulerConfig,
    warnings: &mut Vec<String>,
) {
    let (Some(&first), Some(&last)) = (days.first(), days.last()) else {
        return;
    };
    let mut monday =
        first - Duration::days(i64::from(first.weekday().num_days_from_monday()));
    while monday <= last {
        let sunday = monday + Duration::days(6);
        // Include the day before so a night shift spilling into Monday counts.
        let intervals = busy_intervals(employee, monday, monday - Duration::days(1), sunday);
        let longest = longest_rest(&intervals, 7 * 24);
        if longest < i64::from(config.weekly_rest_hours) {
            warnings.push(format!(
                "{}: week of {} has no {}h rest (longest {}h)",
                employee.name, monday, config.weekly_rest_hours, longest
            ));
        }
        monday += Duration::days(7);
    }
}

fn check_streaks(
    employee: &Employee,
    days: &[NaiveDate],
    config: &SchedulerConfig,
    warnings: &mut Vec<String>,
) {
    let mut streak = 0u32;
    let mut streak_start: Option<NaiveDate> = None;
    for &date in days {
        if employee.worked_on(date) {
            streak += 1;
            streak_start.get_or_insert(date);
            if streak == config.max_consecutive_days + 1 {
                if let Some(start) = streak_start {
                    warnings.push(format!(
                        "{}: more than {} consecutive working days starting {}",
                        employee.name, config.max_consecutive_days, start
                    ));
                }
            }
        } else {
            streak = 0;
            streak_start = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Shift, ShiftKind};
    use crate::shift::ShiftToken;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_schedule(employees: Vec<Employee>) -> Schedule {
        Schedule::new(2024, 3, employees)
    }

    fn run(schedule: &Schedule, demand: Option<&Demand>) -> ValidationResult {
        validate(schedule, demand, &SchedulerConfig::default())
    }

    /// Five day shifts per week with the weekend off, all month.
    fn office_worker() -> Employee {
        let mut e = Employee::new("o", "Olga");
        for date in d("2024-03-01").iter_days().take(31) {
            if !crate::model::is_weekend(date) {
                e.assign(date, Shift::from_token(ShiftToken::Day));
            }
        }
        e
    }

    #[test]
    fn test_regular_week_is_clean() {
        let result = run(&make_schedule(vec![office_worker()]), None);
        assert!(result.is_ok(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_invalid_month_is_error() {
        let schedule = Schedule::new(2024, 0, vec![]);
        assert!(!run(&schedule, None).is_ok());
    }

    #[test]
    fn test_rest_violation_is_error() {
        let mut e = Employee::new("a", "Ana");
        e.assign(d("2024-03-04"), Shift::from_token(ShiftToken::Night));
        e.assign(d("2024-03-05"), Shift::from_token(ShiftToken::Day));
        let result = run(&make_schedule(vec![e]), None);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("insufficient rest (gap 0h"));
    }

    #[test]
    fn test_full_day_shift_rest_violation() {
        let mut e = Employee::new("a", "Ana");
        e.assign(d("2024-03-04"), Shift::custom(ShiftKind::Work, 8, 8).unwrap());
        e.assign(d("2024-03-05"), Shift::from_token(ShiftToken::Day));
        let result = run(&make_schedule(vec![e]), None);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("insufficient rest (gap 0h"));
    }

    #[test]
    fn test_timed_absence_counts_toward_staffing() {
        let mut e = Employee::new("a", "Ana");
        e.assign(d("2024-03-04"), Shift::custom(ShiftKind::Training, 8, 16).unwrap());
        let demand = Demand::new(1, 0, 0);
        let result = run(&make_schedule(vec![e]), Some(&demand));
        assert!(!result
            .warnings
            .iter()
            .any(|w| w.starts_with("2024-03-04") && w.contains("understaffed")));
    }

    #[test]
    fn test_broken_record_is_error() {
        let mut e = Employee::new("a", "Ana");
        let mut shift = Shift::from_token(ShiftToken::Day);
        shift.hours = 7.0;
        e.assign(d("2024-03-04"), shift);
        let mut bad = Shift::custom(ShiftKind::Work, 8, 16).unwrap();
        bad.end_hour = Some(25);
        e.assign(d("2024-03-06"), bad);
        let result = run(&make_schedule(vec![e]), None);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_weekly_rest_warning() {
        // Day shifts every day of the week leave at most 16h between shifts.
        let mut e = Employee::new("a", "Ana");
        for date in d("2024-03-04").iter_days().take(7) {
            e.assign(date, Shift::from_token(ShiftToken::Day));
        }
        let result = run(&make_schedule(vec![e]), None);
        assert!(result.is_ok());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("week of 2024-03-04 has no 35h rest")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("more than 6 consecutive working days")));
    }

    #[test]
    fn test_night_spill_counts_toward_next_week() {
        let intervals = vec![(-4, 8), (40, 48)];
        assert_eq!(longest_rest(&intervals, 168), 120);
        assert_eq!(longest_rest(&[], 168), 168);
        assert_eq!(longest_rest(&[(0, 168)], 168), 0);
    }

    #[test]
    fn test_understaffing_warnings() {
        let mut e = Employee::new("a", "Ana");
        e.assign(d("2024-03-04"), Shift::from_token(ShiftToken::Day));
        let schedule = make_schedule(vec![e]);
        let result = run(&schedule, Some(&Demand::new(1, 0, 0)));
        let understaffed: Vec<&String> = result
            .warnings
            .iter()
            .filter(|w| w.contains("understaffed"))
            .collect();
        // Every day of March except the 4th.
        assert_eq!(understaffed.len(), 30);
        assert!(!understaffed.iter().any(|w| w.starts_with("2024-03-04")));
    }
}
