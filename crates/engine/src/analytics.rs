use serde::Serialize;

use crate::model::{is_weekend, Schedule};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub employee_id: String,
    pub name: String,
    /// Base shift hours within the schedule month.
    pub total_hours: f64,
    /// Monthly override plus explicit per-shift contact hours.
    pub contact_hours: f64,
    pub working_days: u32,
    pub night_shifts: u32,
    pub weekend_shifts: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStats {
    pub employees: Vec<EmployeeStats>,
    pub average_hours: f64,
    /// Difference between the most and least loaded employee.
    pub hour_spread: f64,
}

/// Workload figures for the schedule month.
pub fn schedule_stats(schedule: &Schedule) -> ScheduleStats {
    let days = schedule.month_days();
    let (Some(&first), Some(&last)) = (days.first(), days.last()) else {
        return ScheduleStats {
            employees: Vec::new(),
            average_hours: 0.0,
            hour_spread: 0.0,
        };
    };

    let employees: Vec<EmployeeStats> = schedule
        .employees
        .iter()
        .map(|e| {
            let mut stats = EmployeeStats {
                employee_id: e.id.clone(),
                name: e.name.clone(),
                total_hours: 0.0,
                contact_hours: e.contact_hours_for(schedule.year, schedule.month),
                working_days: 0,
                night_shifts: 0,
                weekend_shifts: 0,
            };
            for (date, shift) in e.shifts.range(first..=last) {
                stats.total_hours += shift.hours;
                stats.contact_hours += shift.contact_hours.unwrap_or(0.0);
                if shift.is_working() {
                    stats.working_days += 1;
                    if is_weekend(*date) {
                        stats.weekend_shifts += 1;
                    }
                }
                if shift.is_night() {
                    stats.night_shifts += 1;
                }
            }
            stats
        })
        .collect();

    let totals = employees.iter().map(|s| s.total_hours);
    let average_hours = if employees.is_empty() {
        0.0
    } else {
        totals.clone().sum::<f64>() / employees.len() as f64
    };
    let hour_spread = match (
        totals.clone().reduce(f64::max),
        totals.reduce(f64::min),
    ) {
        (Some(max), Some(min)) => max - min,
        _ => 0.0,
    };

    ScheduleStats {
        employees,
        average_hours,
        hour_spread,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{month_key, Employee, Shift};
    use crate::shift::ShiftToken;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_stats_for_month() {
        let mut a = Employee::new("a", "Ana");
        a.assign(d("2024-03-02"), Shift::from_token(ShiftToken::Night));
        a.assign(d("2024-03-04"), Shift::from_token(ShiftToken::Day).with_contact_hours(2.0));
        a.assign(d("2024-03-05"), Shift::day_off());
        // Outside the month: ignored.
        a.assign(d("2024-04-01"), Shift::from_token(ShiftToken::Long));
        a.contact_hours.insert(month_key(2024, 3), 3.0);
        let b = Employee::new("b", "Ben");

        let stats = schedule_stats(&Schedule::new(2024, 3, vec![a, b]));
        let ana = &stats.employees[0];
        assert_eq!(ana.total_hours, 20.0);
        assert_eq!(ana.contact_hours, 5.0);
        assert_eq!(ana.working_days, 2);
        assert_eq!(ana.night_shifts, 1);
        assert_eq!(ana.weekend_shifts, 1);
        assert_eq!(stats.average_hours, 10.0);
        assert_eq!(stats.hour_spread, 20.0);
    }

    #[test]
    fn test_empty_roster() {
        let stats = schedule_stats(&Schedule::new(2024, 3, vec![]));
        assert!(stats.employees.is_empty());
        assert_eq!(stats.hour_spread, 0.0);
    }
}
