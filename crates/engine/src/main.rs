use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use shiftfill_engine::config::SchedulerConfig;
use shiftfill_engine::model::{Demand, Employee, Schedule};
use shiftfill_engine::scheduler::{parse_date, ScheduleError, Scheduler};
use shiftfill_engine::scoring::calculate_score_for_roster;
use shiftfill_engine::shift::ShiftToken;
use shiftfill_engine::{analytics, constraints, validator};

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
enum Request {
    #[serde(rename_all = "camelCase")]
    Generate {
        schedule: Schedule,
        start_date: String,
        end_date: String,
        #[serde(default)]
        demand: Demand,
        /// Fixed seed for a reproducible run; drawn at random when absent.
        seed: Option<u64>,
        #[serde(default)]
        config: SchedulerConfig,
    },
    Check {
        employee: Employee,
        date: String,
        shift: String,
        #[serde(default)]
        config: SchedulerConfig,
    },
    Score {
        employee: Employee,
        date: String,
        shift: String,
        /// Full roster, used for the hours average.
        employees: Vec<Employee>,
        #[serde(default)]
        config: SchedulerConfig,
    },
    Validate {
        schedule: Schedule,
        demand: Option<Demand>,
        #[serde(default)]
        config: SchedulerConfig,
    },
    Stats {
        schedule: Schedule,
    },
}

#[derive(Debug, Serialize)]
struct OkResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrResponse {
    ok: bool,
    error: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Unrecognized tokens are not working shifts.
fn proposal(token: &str) -> ShiftToken {
    token.parse().unwrap_or(ShiftToken::DayOff)
}

fn write_ok<T: Serialize>(data: T) {
    let resp = OkResponse { ok: true, data };
    let json = serde_json::to_string(&resp).unwrap_or_else(|e| {
        format!("{{\"ok\":false,\"error\":\"serialization error: {}\"}}", e)
    });
    println!("{}", json);
    let _ = io::stdout().flush();
}

fn write_err(msg: impl std::fmt::Display) -> ! {
    let resp = ErrResponse {
        ok: false,
        error: msg.to_string(),
    };
    let json = serde_json::to_string(&resp).unwrap_or_else(|_| {
        "{\"ok\":false,\"error\":\"double serialization error\"}".to_string()
    });
    println!("{}", json);
    let _ = io::stdout().flush();
    std::process::exit(1);
}

fn init_logging() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn handle(request: Request) -> Result<(), ScheduleError> {
    match request {
        Request::Generate {
            schedule,
            start_date,
            end_date,
            demand,
            seed,
            config,
        } => {
            let start = parse_date(&start_date)?;
            let end = parse_date(&end_date)?;
            let mut scheduler = match seed {
                Some(seed) => Scheduler::with_seed(config, seed)?,
                None => Scheduler::new(config)?,
            };
            write_ok(scheduler.generate(&schedule, start, end, &demand));
        }
        Request::Check {
            employee,
            date,
            shift,
            config,
        } => {
            config.validate()?;
            let date = parse_date(&date)?;
            write_ok(constraints::check_hard_constraints(
                &employee,
                date,
                proposal(&shift),
                &config,
            ));
        }
        Request::Score {
            employee,
            date,
            shift,
            employees,
            config,
        } => {
            config.validate()?;
            let date = parse_date(&date)?;
            write_ok(calculate_score_for_roster(
                &employee,
                date,
                proposal(&shift),
                &employees,
                &config,
            ));
        }
        Request::Validate {
            schedule,
            demand,
            config,
        } => {
            config.validate()?;
            write_ok(validator::validate(&schedule, demand.as_ref(), &config));
        }
        Request::Stats { schedule } => {
            write_ok(analytics::schedule_stats(&schedule));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    init_logging();

    // Read all of stdin
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        write_err(format!("Failed to read stdin: {}", e));
    }

    // Parse request
    let request: Request = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => write_err(format!("Invalid JSON input: {}", e)),
    };

    if let Err(e) = handle(request) {
        write_err(e);
    }
}
