//! Constraint-aware auto-fill for monthly shift rosters.
//!
//! The engine fills empty day slots greedily: every candidate is first checked
//! against the daily rest rule ([`constraints`]), then ranked by a soft score
//! ([`scoring`]) covering night recovery, rotation, weekend fairness, hours
//! balancing and fatigue. [`scheduler::Scheduler`] drives the per-day,
//! per-tranche loop; [`validator`] and [`analytics`] re-derive alerts and
//! workload figures from a finished schedule.

pub mod analytics;
pub mod config;
pub mod constraints;
pub mod model;
pub mod scheduler;
pub mod scoring;
pub mod shift;
pub mod validator;
