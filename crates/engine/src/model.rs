use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::shift::{HourOutOfRange, HourRange, ShiftToken};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What an entry in an employee's calendar represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftKind {
    /// Regular daytime work.
    Work,
    /// Night work (the `20-8` shift).
    Night,
    /// Paid leave.
    PaidLeave,
    /// Paid sick leave.
    SickLeave,
    /// Paid training day.
    Training,
    UnpaidLeave,
    /// Day off ("W"). Zero duration.
    DayOff,
    /// Contact hours only, no regular shift.
    ContactHours,
}

impl ShiftKind {
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            ShiftKind::PaidLeave | ShiftKind::SickLeave | ShiftKind::Training | ShiftKind::UnpaidLeave
        )
    }
}

// ---------------------------------------------------------------------------
// Shift
// ---------------------------------------------------------------------------

/// Hours credited to an absence recorded without an explicit window.
pub const DEFAULT_ABSENCE_HOURS: f64 = 8.0;

/// One calendar cell: at most one per employee per date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(rename = "type")]
    pub kind: ShiftKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_hour: Option<u8>,
    pub hours: f64,
    /// Explicit contact hours layered on top of `hours`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_hours: Option<f64>,
}

impl Shift {
    /// Build the shift record for one of the fixed tokens.
    pub fn from_token(token: ShiftToken) -> Self {
        match token.hours() {
            Some(range) => Shift {
                kind: if token.is_night() {
                    ShiftKind::Night
                } else {
                    ShiftKind::Work
                },
                start_hour: Some(range.start),
                end_hour: Some(range.end),
                hours: f64::from(range.duration()),
                contact_hours: None,
            },
            None => Shift::day_off(),
        }
    }

    /// A shift with an arbitrary hour window (manual entry). Both hours
    /// must be within 0-23.
    pub fn custom(kind: ShiftKind, start: u8, end: u8) -> Result<Self, HourOutOfRange> {
        let range = HourRange::checked(start, end)?;
        Ok(Shift {
            kind,
            start_hour: Some(range.start),
            end_hour: Some(range.end),
            hours: f64::from(range.duration()),
            contact_hours: None,
        })
    }

    pub fn day_off() -> Self {
        Shift {
            kind: ShiftKind::DayOff,
            start_hour: None,
            end_hour: None,
            hours: 0.0,
            contact_hours: None,
        }
    }

    /// An absence, optionally with an hour window. Absences without one are
    /// credited [`DEFAULT_ABSENCE_HOURS`].
    pub fn absence(kind: ShiftKind, window: Option<HourRange>) -> Result<Self, HourOutOfRange> {
        match window {
            Some(range) => Shift::custom(kind, range.start, range.end),
            None => Ok(Shift {
                kind,
                start_hour: None,
                end_hour: None,
                hours: DEFAULT_ABSENCE_HOURS,
                contact_hours: None,
            }),
        }
    }

    pub fn with_contact_hours(mut self, hours: f64) -> Self {
        self.contact_hours = Some(hours);
        self
    }

    /// Hour window, if both hours are set and within 0-23.
    pub fn window(&self) -> Option<HourRange> {
        match (self.start_hour, self.end_hour) {
            (Some(start), Some(end)) if start < 24 && end < 24 => Some(HourRange::new(start, end)),
            _ => None,
        }
    }

    /// Anything but a day off counts as worked for the fairness rules.
    pub fn is_working(&self) -> bool {
        self.kind != ShiftKind::DayOff
    }

    pub fn is_night(&self) -> bool {
        self.kind == ShiftKind::Night
            || self.window() == ShiftToken::Night.hours()
    }

    /// Duration the record should carry according to its window and kind.
    pub fn expected_hours(&self) -> f64 {
        match self.window() {
            Some(range) => f64::from(range.duration()),
            None if self.kind.is_absence() => DEFAULT_ABSENCE_HOURS,
            None => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    /// Free-form role tags ("lead", "caregiver", ...). Not read by the
    /// heuristic.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Calendar keyed by ISO date. One entry per date at most.
    #[serde(default)]
    pub shifts: BTreeMap<NaiveDate, Shift>,
    /// Manual contact-hours override keyed by month (`YYYY-MM`).
    #[serde(default)]
    pub contact_hours: BTreeMap<String, f64>,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Employee {
            id: id.into(),
            name: name.into(),
            roles: Vec::new(),
            shifts: BTreeMap::new(),
            contact_hours: BTreeMap::new(),
        }
    }

    pub fn shift_on(&self, date: NaiveDate) -> Option<&Shift> {
        self.shifts.get(&date)
    }

    pub fn has_shift_on(&self, date: NaiveDate) -> bool {
        self.shifts.contains_key(&date)
    }

    pub fn worked_on(&self, date: NaiveDate) -> bool {
        self.shift_on(date).is_some_and(Shift::is_working)
    }

    pub fn worked_night_on(&self, date: NaiveDate) -> bool {
        self.shift_on(date).is_some_and(Shift::is_night)
    }

    /// All-time accumulated `hours` across every recorded shift.
    pub fn total_hours(&self) -> f64 {
        self.shifts.values().map(|s| s.hours).sum()
    }

    /// Record `shift` on `date` only if the date is still empty. Returns
    /// whether the shift was stored.
    pub fn assign(&mut self, date: NaiveDate, shift: Shift) -> bool {
        use std::collections::btree_map::Entry;
        match self.shifts.entry(date) {
            Entry::Vacant(slot) => {
                slot.insert(shift);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn contact_hours_for(&self, year: i32, month: u32) -> f64 {
        self.contact_hours
            .get(&month_key(year, month))
            .copied()
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Schedule and demand
// ---------------------------------------------------------------------------

/// One month of the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Calendar month, 1-12.
    pub month: u32,
    pub year: i32,
    pub employees: Vec<Employee>,
}

impl Schedule {
    pub fn new(year: i32, month: u32, employees: Vec<Employee>) -> Self {
        Schedule {
            month,
            year,
            employees,
        }
    }

    /// Every date of the schedule month, in order. Empty for an invalid
    /// month.
    pub fn month_days(&self) -> Vec<NaiveDate> {
        let Some(first) = NaiveDate::from_ymd_opt(self.year, self.month, 1) else {
            return Vec::new();
        };
        first
            .iter_days()
            .take_while(|d| d.month() == self.month)
            .collect()
    }
}

/// Head-count needed per tranche, applied to every day of a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    #[serde(default)]
    pub morning: u32,
    #[serde(default)]
    pub afternoon: u32,
    #[serde(default)]
    pub night: u32,
}

impl Demand {
    pub fn new(morning: u32, afternoon: u32, night: u32) -> Self {
        Demand {
            morning,
            afternoon,
            night,
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar helpers
// ---------------------------------------------------------------------------

pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn days_before(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_sub_signed(Duration::days(days))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_shift_from_token() {
        let day = Shift::from_token(ShiftToken::Day);
        assert_eq!(day.kind, ShiftKind::Work);
        assert_eq!(day.start_hour, Some(8));
        assert_eq!(day.end_hour, Some(16));
        assert_eq!(day.hours, 8.0);

        let night = Shift::from_token(ShiftToken::Night);
        assert_eq!(night.kind, ShiftKind::Night);
        assert_eq!(night.hours, 12.0);
        assert!(night.is_night());

        let off = Shift::from_token(ShiftToken::DayOff);
        assert_eq!(off.kind, ShiftKind::DayOff);
        assert_eq!(off.hours, 0.0);
        assert!(!off.is_working());
    }

    #[test]
    fn test_absence_defaults_to_eight_hours() {
        let leave = Shift::absence(ShiftKind::PaidLeave, None).unwrap();
        assert_eq!(leave.hours, 8.0);
        assert!(leave.is_working());

        let partial =
            Shift::absence(ShiftKind::SickLeave, Some(HourRange::new(8, 12))).unwrap();
        assert_eq!(partial.hours, 4.0);
        assert_eq!(partial.expected_hours(), 4.0);
    }

    #[test]
    fn test_custom_rejects_hours_past_23() {
        assert_eq!(
            Shift::custom(ShiftKind::Work, 25, 8),
            Err(HourOutOfRange(25))
        );
        assert!(Shift::absence(ShiftKind::Training, Some(HourRange::new(8, 30))).is_err());
        assert_eq!(Shift::custom(ShiftKind::Work, 8, 8).unwrap().hours, 24.0);
    }

    #[test]
    fn test_assign_never_overwrites() {
        let mut e = Employee::new("e1", "Ana");
        let date = d("2024-03-04");
        assert!(e.assign(date, Shift::from_token(ShiftToken::Night)));
        assert!(!e.assign(date, Shift::from_token(ShiftToken::Day)));
        assert_eq!(e.shift_on(date).unwrap().kind, ShiftKind::Night);
        assert_eq!(e.total_hours(), 12.0);
    }

    #[test]
    fn test_json_shape() {
        let mut e = Employee::new("e1", "Ana");
        e.assign(d("2024-03-04"), Shift::from_token(ShiftToken::Day));
        let json = serde_json::to_value(&e).unwrap();
        let cell = &json["shifts"]["2024-03-04"];
        assert_eq!(cell["type"], "WORK");
        assert_eq!(cell["startHour"], 8);
        assert_eq!(cell["endHour"], 16);
        assert_eq!(cell["hours"], 8.0);

        let back: Employee = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_month_days_and_weekends() {
        let schedule = Schedule::new(2024, 2, vec![]);
        let days = schedule.month_days();
        assert_eq!(days.len(), 29);
        assert_eq!(days[0], d("2024-02-01"));
        assert!(is_weekend(d("2024-03-02")));
        assert!(!is_weekend(d("2024-03-04")));
        assert_eq!(Schedule::new(2024, 13, vec![]).month_days().len(), 0);
    }

    #[test]
    fn test_contact_hours_override() {
        let mut e = Employee::new("e1", "Ana");
        e.contact_hours.insert(month_key(2024, 3), 6.5);
        assert_eq!(e.contact_hours_for(2024, 3), 6.5);
        assert_eq!(e.contact_hours_for(2024, 4), 0.0);
    }
}
