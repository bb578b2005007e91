#![deny(clippy::all)]

use std::collections::HashMap;

use napi_derive::napi;
use shiftfill_engine::model as engine;
use shiftfill_engine::config as engine_config;
use shiftfill_engine::scheduler::{self, parse_date, Scheduler};
use shiftfill_engine::shift::ShiftToken;
use shiftfill_engine::{analytics, constraints, scoring, validator};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[napi(string_enum)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftKind {
    #[napi(value = "WORK")]
    Work,
    #[napi(value = "NIGHT")]
    Night,
    #[napi(value = "PAID_LEAVE")]
    PaidLeave,
    #[napi(value = "SICK_LEAVE")]
    SickLeave,
    #[napi(value = "TRAINING")]
    Training,
    #[napi(value = "UNPAID_LEAVE")]
    UnpaidLeave,
    #[napi(value = "DAY_OFF")]
    DayOff,
    #[napi(value = "CONTACT_HOURS")]
    ContactHours,
}

impl From<ShiftKind> for engine::ShiftKind {
    fn from(v: ShiftKind) -> Self {
        match v {
            ShiftKind::Work => engine::ShiftKind::Work,
            ShiftKind::Night => engine::ShiftKind::Night,
            ShiftKind::PaidLeave => engine::ShiftKind::PaidLeave,
            ShiftKind::SickLeave => engine::ShiftKind::SickLeave,
            ShiftKind::Training => engine::ShiftKind::Training,
            ShiftKind::UnpaidLeave => engine::ShiftKind::UnpaidLeave,
            ShiftKind::DayOff => engine::ShiftKind::DayOff,
            ShiftKind::ContactHours => engine::ShiftKind::ContactHours,
        }
    }
}

impl From<engine::ShiftKind> for ShiftKind {
    fn from(v: engine::ShiftKind) -> Self {
        match v {
            engine::ShiftKind::Work => ShiftKind::Work,
            engine::ShiftKind::Night => ShiftKind::Night,
            engine::ShiftKind::PaidLeave => ShiftKind::PaidLeave,
            engine::ShiftKind::SickLeave => ShiftKind::SickLeave,
            engine::ShiftKind::Training => ShiftKind::Training,
            engine::ShiftKind::UnpaidLeave => ShiftKind::UnpaidLeave,
            engine::ShiftKind::DayOff => ShiftKind::DayOff,
            engine::ShiftKind::ContactHours => ShiftKind::ContactHours,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_napi_err(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn hour_to_engine(hour: Option<u32>) -> napi::Result<Option<u8>> {
    hour.map(|h| {
        u8::try_from(h)
            .ok()
            .filter(|h| *h < 24)
            .ok_or_else(|| to_napi_err(format!("hour {} is outside 0-23", h)))
    })
    .transpose()
}

/// Unrecognized tokens are not working shifts.
fn proposal(token: &str) -> ShiftToken {
    token.parse().unwrap_or(ShiftToken::DayOff)
}

// ---------------------------------------------------------------------------
// Mirror types
// ---------------------------------------------------------------------------

#[napi(object)]
#[derive(Debug, Clone)]
pub struct Shift {
    #[napi(js_name = "type")]
    pub kind: ShiftKind,
    pub start_hour: Option<u32>,
    pub end_hour: Option<u32>,
    pub hours: f64,
    pub contact_hours: Option<f64>,
}

impl TryFrom<Shift> for engine::Shift {
    type Error = napi::Error;

    fn try_from(v: Shift) -> napi::Result<Self> {
        Ok(engine::Shift {
            kind: v.kind.into(),
            start_hour: hour_to_engine(v.start_hour)?,
            end_hour: hour_to_engine(v.end_hour)?,
            hours: v.hours,
            contact_hours: v.contact_hours,
        })
    }
}

impl From<engine::Shift> for Shift {
    fn from(v: engine::Shift) -> Self {
        Shift {
            kind: v.kind.into(),
            start_hour: v.start_hour.map(u32::from),
            end_hour: v.end_hour.map(u32::from),
            hours: v.hours,
            contact_hours: v.contact_hours,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub roles: Option<Vec<String>>,
    /// Keyed by ISO date.
    pub shifts: HashMap<String, Shift>,
    /// Keyed by month (`YYYY-MM`).
    pub contact_hours: Option<HashMap<String, f64>>,
}

impl TryFrom<Employee> for engine::Employee {
    type Error = napi::Error;

    fn try_from(v: Employee) -> napi::Result<Self> {
        let shifts = v
            .shifts
            .into_iter()
            .map(|(date, shift)| {
                let date = parse_date(&date).map_err(to_napi_err)?;
                Ok((date, engine::Shift::try_from(shift)?))
            })
            .collect::<napi::Result<_>>()?;
        Ok(engine::Employee {
            id: v.id,
            name: v.name,
            roles: v.roles.unwrap_or_default(),
            shifts,
            contact_hours: v.contact_hours.unwrap_or_default().into_iter().collect(),
        })
    }
}

impl From<engine::Employee> for Employee {
    fn from(v: engine::Employee) -> Self {
        Employee {
            id: v.id,
            name: v.name,
            roles: Some(v.roles),
            shifts: v
                .shifts
                .into_iter()
                .map(|(date, shift)| (date.to_string(), shift.into()))
                .collect(),
            contact_hours: Some(v.contact_hours.into_iter().collect()),
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct Schedule {
    pub month: u32,
    pub year: i32,
    pub employees: Vec<Employee>,
}

impl TryFrom<Schedule> for engine::Schedule {
    type Error = napi::Error;

    fn try_from(v: Schedule) -> napi::Result<Self> {
        Ok(engine::Schedule {
            month: v.month,
            year: v.year,
            employees: v
                .employees
                .into_iter()
                .map(engine::Employee::try_from)
                .collect::<napi::Result<_>>()?,
        })
    }
}

impl From<engine::Schedule> for Schedule {
    fn from(v: engine::Schedule) -> Self {
        Schedule {
            month: v.month,
            year: v.year,
            employees: v.employees.into_iter().map(Into::into).collect(),
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct Demand {
    pub morning: u32,
    pub afternoon: u32,
    pub night: u32,
}

impl From<Demand> for engine::Demand {
    fn from(v: Demand) -> Self {
        engine::Demand::new(v.morning, v.afternoon, v.night)
    }
}

/// Score weights; omitted fields keep their defaults.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct ScoreWeights {
    pub night_recovery_penalty: Option<i32>,
    pub night_recovery_bonus: Option<i32>,
    pub post_night_penalty: Option<i32>,
    pub weekend_penalty: Option<i32>,
    pub weekend_bonus: Option<i32>,
    pub under_average_bonus: Option<i32>,
    pub over_average_penalty: Option<i32>,
    pub fatigue_penalty: Option<i32>,
}

impl From<ScoreWeights> for engine_config::ScoreWeights {
    fn from(v: ScoreWeights) -> Self {
        let d = engine_config::ScoreWeights::default();
        engine_config::ScoreWeights {
            night_recovery_penalty: v.night_recovery_penalty.unwrap_or(d.night_recovery_penalty),
            night_recovery_bonus: v.night_recovery_bonus.unwrap_or(d.night_recovery_bonus),
            post_night_penalty: v.post_night_penalty.unwrap_or(d.post_night_penalty),
            weekend_penalty: v.weekend_penalty.unwrap_or(d.weekend_penalty),
            weekend_bonus: v.weekend_bonus.unwrap_or(d.weekend_bonus),
            under_average_bonus: v.under_average_bonus.unwrap_or(d.under_average_bonus),
            over_average_penalty: v.over_average_penalty.unwrap_or(d.over_average_penalty),
            fatigue_penalty: v.fatigue_penalty.unwrap_or(d.fatigue_penalty),
        }
    }
}

/// Scheduler thresholds; omitted fields keep their defaults.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    pub min_rest_hours: Option<i32>,
    pub balance_margin_hours: Option<u32>,
    pub fatigue_streak_days: Option<u32>,
    pub fatigue_lookback_days: Option<u32>,
    pub weekly_rest_hours: Option<u32>,
    pub max_consecutive_days: Option<u32>,
    pub weights: Option<ScoreWeights>,
}

impl TryFrom<SchedulerConfig> for engine_config::SchedulerConfig {
    type Error = napi::Error;

    fn try_from(v: SchedulerConfig) -> napi::Result<Self> {
        let d = engine_config::SchedulerConfig::default();
        let config = engine_config::SchedulerConfig {
            min_rest_hours: v.min_rest_hours.unwrap_or(d.min_rest_hours),
            balance_margin_hours: v.balance_margin_hours.unwrap_or(d.balance_margin_hours),
            fatigue_streak_days: v.fatigue_streak_days.unwrap_or(d.fatigue_streak_days),
            fatigue_lookback_days: v.fatigue_lookback_days.unwrap_or(d.fatigue_lookback_days),
            weekly_rest_hours: v.weekly_rest_hours.unwrap_or(d.weekly_rest_hours),
            max_consecutive_days: v.max_consecutive_days.unwrap_or(d.max_consecutive_days),
            weights: v.weights.map(Into::into).unwrap_or(d.weights),
        };
        config.validate().map_err(to_napi_err)?;
        Ok(config)
    }
}

fn config_to_engine(config: Option<SchedulerConfig>) -> napi::Result<engine_config::SchedulerConfig> {
    config.unwrap_or_default().try_into()
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[napi(object)]
#[derive(Debug, Clone)]
pub struct ConstraintCheck {
    pub valid: bool,
    pub reason: Option<String>,
}

impl From<constraints::ConstraintCheck> for ConstraintCheck {
    fn from(v: constraints::ConstraintCheck) -> Self {
        ConstraintCheck {
            valid: v.valid,
            reason: v.reason,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub score: i32,
    pub reasons: Vec<String>,
}

impl From<scoring::ScoreResult> for ScoreResult {
    fn from(v: scoring::ScoreResult) -> Self {
        ScoreResult {
            score: v.score,
            reasons: v.reasons,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct Assignment {
    pub employee_id: String,
    pub date: String,
    pub shift: String,
    pub score: i32,
    pub reasons: Vec<String>,
}

impl From<scheduler::Assignment> for Assignment {
    fn from(v: scheduler::Assignment) -> Self {
        Assignment {
            employee_id: v.employee_id,
            date: v.date.to_string(),
            shift: v.shift.to_string(),
            score: v.score,
            reasons: v.reasons,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct UnfilledSlot {
    pub date: String,
    /// `morning`, `afternoon` or `night`.
    pub tranche: String,
    pub missing: u32,
}

impl From<scheduler::UnfilledSlot> for UnfilledSlot {
    fn from(v: scheduler::UnfilledSlot) -> Self {
        let tranche = match v.tranche {
            scheduler::Tranche::Morning => "morning",
            scheduler::Tranche::Afternoon => "afternoon",
            scheduler::Tranche::Night => "night",
        };
        UnfilledSlot {
            date: v.date.to_string(),
            tranche: tranche.to_string(),
            missing: v.missing,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub schedule: Schedule,
    pub assignments: Vec<Assignment>,
    pub unfilled: Vec<UnfilledSlot>,
    /// Seed that replays this run.
    pub seed: String,
    pub warnings: Vec<String>,
}

impl From<scheduler::Generation> for GenerationResult {
    fn from(v: scheduler::Generation) -> Self {
        GenerationResult {
            schedule: v.schedule.into(),
            assignments: v.assignments.into_iter().map(Into::into).collect(),
            unfilled: v.unfilled.into_iter().map(Into::into).collect(),
            seed: v.seed.to_string(),
            warnings: v.warnings,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<validator::ValidationResult> for ValidationResult {
    fn from(v: validator::ValidationResult) -> Self {
        ValidationResult {
            errors: v.errors,
            warnings: v.warnings,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct EmployeeStats {
    pub employee_id: String,
    pub name: String,
    pub total_hours: f64,
    pub contact_hours: f64,
    pub working_days: u32,
    pub night_shifts: u32,
    pub weekend_shifts: u32,
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct ScheduleStats {
    pub employees: Vec<EmployeeStats>,
    pub average_hours: f64,
    pub hour_spread: f64,
}

impl From<analytics::ScheduleStats> for ScheduleStats {
    fn from(v: analytics::ScheduleStats) -> Self {
        ScheduleStats {
            employees: v
                .employees
                .into_iter()
                .map(|e| EmployeeStats {
                    employee_id: e.employee_id,
                    name: e.name,
                    total_hours: e.total_hours,
                    contact_hours: e.contact_hours,
                    working_days: e.working_days,
                    night_shifts: e.night_shifts,
                    weekend_shifts: e.weekend_shifts,
                })
                .collect(),
            average_hours: v.average_hours,
            hour_spread: v.hour_spread,
        }
    }
}

// ---------------------------------------------------------------------------
// Exported functions
// ---------------------------------------------------------------------------

/// Auto-fill empty slots between `startDate` and `endDate` (inclusive).
/// The seed is a decimal string so the full u64 range survives JS numbers.
#[napi]
pub fn generate_schedule(
    schedule: Schedule,
    start_date: String,
    end_date: String,
    demand: Demand,
    seed: Option<String>,
    config: Option<SchedulerConfig>,
) -> napi::Result<GenerationResult> {
    let engine_schedule = engine::Schedule::try_from(schedule)?;
    let start = parse_date(&start_date).map_err(to_napi_err)?;
    let end = parse_date(&end_date).map_err(to_napi_err)?;
    let config = config_to_engine(config)?;

    let mut scheduler = match seed {
        Some(seed) => {
            let seed: u64 = seed.parse().map_err(to_napi_err)?;
            Scheduler::with_seed(config, seed)
        }
        None => Scheduler::new(config),
    }
    .map_err(to_napi_err)?;

    Ok(scheduler
        .generate(&engine_schedule, start, end, &demand.into())
        .into())
}

#[napi]
pub fn check_hard_constraints(
    employee: Employee,
    date: String,
    shift: String,
    config: Option<SchedulerConfig>,
) -> napi::Result<ConstraintCheck> {
    let employee = engine::Employee::try_from(employee)?;
    let date = parse_date(&date).map_err(to_napi_err)?;
    let config = config_to_engine(config)?;
    Ok(constraints::check_hard_constraints(
        &employee,
        date,
        proposal(&shift),
        &config,
    )
    .into())
}

#[napi]
pub fn calculate_score(
    employee: Employee,
    date: String,
    shift: String,
    employees: Vec<Employee>,
    config: Option<SchedulerConfig>,
) -> napi::Result<ScoreResult> {
    let employee = engine::Employee::try_from(employee)?;
    let roster = employees
        .into_iter()
        .map(engine::Employee::try_from)
        .collect::<napi::Result<Vec<_>>>()?;
    let date = parse_date(&date).map_err(to_napi_err)?;
    let config = config_to_engine(config)?;
    Ok(scoring::calculate_score_for_roster(
        &employee,
        date,
        proposal(&shift),
        &roster,
        &config,
    )
    .into())
}

/// Validate a finished schedule and return errors and warnings.
#[napi]
pub fn validate_schedule(
    schedule: Schedule,
    demand: Option<Demand>,
    config: Option<SchedulerConfig>,
) -> napi::Result<ValidationResult> {
    let engine_schedule = engine::Schedule::try_from(schedule)?;
    let demand = demand.map(engine::Demand::from);
    let config = config_to_engine(config)?;
    Ok(validator::validate(&engine_schedule, demand.as_ref(), &config).into())
}

#[napi]
pub fn schedule_stats(schedule: Schedule) -> napi::Result<ScheduleStats> {
    let engine_schedule = engine::Schedule::try_from(schedule)?;
    Ok(analytics::schedule_stats(&engine_schedule).into())
}
