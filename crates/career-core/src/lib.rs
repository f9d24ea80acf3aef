#![deny(warnings)]

//! Core domain model for the career ladder.
//!
//! This crate defines the job catalog, the player state with its clamped
//! invariants, and the promotion rules that walk the branching career graph.

pub mod catalog;
pub mod config;
pub mod promotion;
pub mod stats;

pub use catalog::{
    CareerPath, CatalogError, Enrollment, Job, JobCatalog, JobId, Requirements, ALL_PATHS,
    INTERVIEW_EXEMPT,
};
pub use config::{ConfigError, EventMode, GameConfig};
pub use promotion::{
    available_promotions, meets_job_requirements, requires_interview,
    should_show_graduation_ceremony, RequirementCheck, Shortfall,
};
pub use stats::{
    game_outcome, ActionId, OutcomeReason, PlayerStats, StartingPlan, StatDelta, HISTORY_LEN,
    MAX_GAUGE, MAX_SKILL, STARTING_AGE, WEEKS_PER_YEAR,
};
