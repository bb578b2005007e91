use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::{ConfigError, SchedulerConfig};
use crate::model::{Demand, Employee, Schedule, Shift};
use crate::scoring::{calculate_score, Workload, ILLEGAL_SCORE};
use crate::shift::ShiftToken;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(s.to_string()))
}

// ---------------------------------------------------------------------------
// Tranches
// ---------------------------------------------------------------------------

/// Demand bucket a shift falls into, derived from its start hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tranche {
    Morning,
    Afternoon,
    Night,
}

impl Tranche {
    /// Hardest-to-staff first.
    pub const FILL_ORDER: [Tranche; 3] = [Tranche::Night, Tranche::Afternoon, Tranche::Morning];

    pub fn from_start_hour(hour: u8) -> Option<Tranche> {
        match hour {
            6 | 8 => Some(Tranche::Morning),
            14 => Some(Tranche::Afternoon),
            20 | 22 => Some(Tranche::Night),
            _ => None,
        }
    }

    /// The single token the assignor proposes for this tranche.
    pub fn token(&self) -> ShiftToken {
        match self {
            Tranche::Morning => ShiftToken::Day,
            Tranche::Afternoon => ShiftToken::Late,
            Tranche::Night => ShiftToken::Night,
        }
    }

    pub fn demanded(&self, demand: &Demand) -> u32 {
        match self {
            Tranche::Morning => demand.morning,
            Tranche::Afternoon => demand.afternoon,
            Tranche::Night => demand.night,
        }
    }
}

/// Head-count already staffed per tranche on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrancheCounts {
    pub morning: u32,
    pub afternoon: u32,
    pub night: u32,
}

impl TrancheCounts {
    pub fn get(&self, tranche: Tranche) -> u32 {
        match tranche {
            Tranche::Morning => self.morning,
            Tranche::Afternoon => self.afternoon,
            Tranche::Night => self.night,
        }
    }

    fn bump(&mut self, tranche: Tranche) {
        match tranche {
            Tranche::Morning => self.morning += 1,
            Tranche::Afternoon => self.afternoon += 1,
            Tranche::Night => self.night += 1,
        }
    }
}

/// Count the shifts on `date` by tranche, classifying each record by its
/// start hour whatever its kind. Records without a start hour never count.
pub fn tranche_counts(employees: &[Employee], date: NaiveDate) -> TrancheCounts {
    let mut counts = TrancheCounts::default();
    for shift in employees.iter().filter_map(|e| e.shift_on(date)) {
        if let Some(tranche) = shift.start_hour.and_then(Tranche::from_start_hour) {
            counts.bump(tranche);
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Roster ledger
// ---------------------------------------------------------------------------

/// Running hour totals so the roster average is not recomputed from scratch
/// for every candidate.
#[derive(Debug, Clone)]
pub struct RosterLedger {
    hours: Vec<f64>,
    total: f64,
}

impl RosterLedger {
    pub fn new(employees: &[Employee]) -> Self {
        let hours: Vec<f64> = employees.iter().map(Employee::total_hours).collect();
        let total = hours.iter().sum();
        RosterLedger { hours, total }
    }

    pub fn average(&self) -> f64 {
        if self.hours.is_empty() {
            0.0
        } else {
            self.total / self.hours.len() as f64
        }
    }

    pub fn workload(&self, idx: usize) -> Workload {
        Workload {
            employee_hours: self.hours[idx],
            average_hours: self.average(),
        }
    }

    pub fn record(&mut self, idx: usize, hours: f64) {
        self.hours[idx] += hours;
        self.total += hours;
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A shift committed by the assignor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub employee_id: String,
    pub date: NaiveDate,
    pub shift: ShiftToken,
    pub score: i32,
    pub reasons: Vec<String>,
}

/// Slots of one tranche on one day that no legal candidate could fill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnfilledSlot {
    pub date: NaiveDate,
    pub tranche: Tranche,
    pub missing: u32,
}

/// Result of one auto-fill run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub schedule: Schedule,
    pub assignments: Vec<Assignment>,
    pub unfilled: Vec<UnfilledSlot>,
    /// Seed that reproduces this run.
    pub seed: u64,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Greedy auto-fill engine. Owns its random source so a seeded instance
/// replays identically.
pub struct Scheduler {
    config: SchedulerConfig,
    rng: ChaCha8Rng,
    seed: u64,
}

impl Scheduler {
    /// Scheduler with a freshly drawn seed.
    pub fn new(config: SchedulerConfig) -> Result<Self, ScheduleError> {
        Self::with_seed(config, rand::random())
    }

    pub fn with_seed(config: SchedulerConfig, seed: u64) -> Result<Self, ScheduleError> {
        config.validate()?;
        Ok(Scheduler {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fill empty slots between `start` and `end` (inclusive) to meet
    /// `demand`. `schedule` is left untouched; a filled copy is returned.
    ///
    /// Per day, tranches are filled night first, then afternoon, then
    /// morning. For every missing slot the roster is shuffled and the
    /// highest-scoring legal employee without a shift that day is chosen.
    /// Slots without a legal candidate stay empty and are reported in
    /// [`Generation::unfilled`].
    pub fn generate(
        &mut self,
        schedule: &Schedule,
        start: NaiveDate,
        end: NaiveDate,
        demand: &Demand,
    ) -> Generation {
        let mut result = schedule.clone();
        let mut ledger = RosterLedger::new(&result.employees);
        let mut assignments: Vec<Assignment> = Vec::new();
        let mut unfilled: Vec<UnfilledSlot> = Vec::new();

        let days: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();

        info!(
            event = "generate_start",
            days = days.len(),
            employees = result.employees.len(),
            seed = self.seed,
        );

        let mut order: Vec<usize> = (0..result.employees.len()).collect();

        for date in days.iter().copied() {
            let counts = tranche_counts(&result.employees, date);

            for tranche in Tranche::FILL_ORDER {
                let needed = tranche.demanded(demand).saturating_sub(counts.get(tranche));
                let token = tranche.token();

                for slot in 0..needed {
                    order.shuffle(&mut self.rng);

                    let mut best: Option<(usize, i32, Vec<String>)> = None;
                    for &idx in &order {
                        let employee = &result.employees[idx];
                        if employee.has_shift_on(date) {
                            continue;
                        }
                        let scored = calculate_score(
                            employee,
                            date,
                            token,
                            &ledger.workload(idx),
                            &self.config,
                        );
                        trace!(
                            employee = %employee.id,
                            %date,
                            shift = %token,
                            score = scored.score,
                        );
                        let beats_best = best
                            .as_ref()
                            .map_or(true, |(_, best_score, _)| scored.score > *best_score);
                        if scored.score > ILLEGAL_SCORE && beats_best {
                            best = Some((idx, scored.score, scored.reasons));
                        }
                    }

                    let Some((idx, score, reasons)) = best else {
                        // Nothing changed since this scan, so the remaining
                        // slots of the tranche cannot be filled either.
                        let missing = needed - slot;
                        debug!(%date, ?tranche, missing, "slot left unfilled");
                        unfilled.push(UnfilledSlot {
                            date,
                            tranche,
                            missing,
                        });
                        break;
                    };

                    let shift = Shift::from_token(token);
                    let hours = shift.hours;
                    let employee = &mut result.employees[idx];
                    if employee.assign(date, shift) {
                        ledger.record(idx, hours);
                        debug!(employee = %employee.id, %date, shift = %token, score, "assigned");
                        assignments.push(Assignment {
                            employee_id: employee.id.clone(),
                            date,
                            shift: token,
                            score,
                            reasons,
                        });
                    }
                }
            }
        }

        info!(
            event = "generate_end",
            days = days.len(),
            seed = self.seed,
            assigned = assignments.len(),
            unfilled = unfilled.iter().map(|u| u.missing).sum::<u32>(),
        );

        let warnings = unfilled
            .iter()
            .map(|u| {
                format!(
                    "{}: {} {:?} slot(s) left unfilled -- no legal candidate",
                    u.date, u.missing, u.tranche
                )
            })
            .collect();

        Generation {
            schedule: result,
            assignments,
            unfilled,
            seed: self.seed,
            warnings,
        }
    }

    /// Same as [`Scheduler::generate`], returning only the filled schedule.
    pub fn generate_schedule(
        &mut self,
        schedule: &Schedule,
        start: NaiveDate,
        end: NaiveDate,
        demand: &Demand,
    ) -> Schedule {
        self.generate(schedule, start, end, demand).schedule
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// One-shot auto-fill over ISO date strings with default rules.
///
/// An end date before the start date processes no days and returns an
/// unchanged copy.
pub fn generate_schedule(
    schedule: &Schedule,
    start_date: &str,
    end_date: &str,
    demand: &Demand,
    seed: u64,
) -> Result<Schedule, ScheduleError> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;
    let mut scheduler = Scheduler::with_seed(SchedulerConfig::default(), seed)?;
    Ok(scheduler.generate_schedule(schedule, start, end, demand))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
