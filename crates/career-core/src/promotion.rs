//! Promotion resolution over the career graph.
//!
//! The graph is not a single ladder: students fork into traditional
//! employment or independent work, and bridge nodes (declared on the job
//! data via `bridges_to`) fan out into downstream tracks.

use crate::catalog::{CareerPath, Job, JobCatalog, INTERVIEW_EXEMPT};
use std::fmt;
use tracing::debug;

/// One unmet requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shortfall {
    Coding { have: u16, need: u16 },
    Reputation { have: u16, need: u16 },
    Money { have: i64, need: i64 },
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortfall::Coding { have, need } => {
                write!(f, "Coding skill {have} is below the required {need}")
            }
            Shortfall::Reputation { have, need } => {
                write!(f, "Reputation {have} is below the required {need}")
            }
            Shortfall::Money { have, need } => {
                write!(f, "Savings of ${have} are below the required ${need}")
            }
        }
    }
}

/// Result of checking a player against a job's thresholds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequirementCheck {
    pub meets: bool,
    /// Every unmet requirement, ordered coding, reputation, money.
    pub shortfalls: Vec<Shortfall>,
}

impl RequirementCheck {
    pub fn failure_reasons(&self) -> Vec<String> {
        self.shortfalls.iter().map(ToString::to_string).collect()
    }
}

pub fn meets_job_requirements(
    job: &Job,
    coding: u16,
    reputation: u16,
    money: i64,
) -> RequirementCheck {
    let req = &job.requirements;
    let mut shortfalls = Vec::new();
    if coding < req.coding {
        shortfalls.push(Shortfall::Coding {
            have: coding,
            need: req.coding,
        });
    }
    if reputation < req.reputation {
        shortfalls.push(Shortfall::Reputation {
            have: reputation,
            need: req.reputation,
        });
    }
    if let Some(need) = req.money {
        if money < need {
            shortfalls.push(Shortfall::Money { have: money, need });
        }
    }
    RequirementCheck {
        meets: shortfalls.is_empty(),
        shortfalls,
    }
}

fn is_eligible(job: &Job, coding: u16, reputation: u16, money: i64) -> bool {
    let req = &job.requirements;
    coding >= req.coding
        && reputation >= req.reputation
        && req.money.map_or(true, |need| money >= need)
}

/// Structural filter: level floor, pay upgrade on lateral moves, and the
/// student variants never targeting each other.
fn is_upward_move(current: &Job, candidate: &Job) -> bool {
    if candidate.id == current.id || candidate.level < current.level {
        return false;
    }
    if candidate.level == current.level && candidate.yearly_pay <= current.yearly_pay {
        return false;
    }
    !(current.is_student() && candidate.is_student())
}

fn is_path_compatible(current: &Job, candidate: &Job) -> bool {
    if current.is_student() {
        // Graduation: traditional employment or going independent.
        return matches!(candidate.path, CareerPath::Corporate | CareerPath::Hustler);
    }
    candidate.path == current.path || current.bridges(candidate.path)
}

/// Jobs the player can move into right now, in catalog order.
pub fn available_promotions<'c>(
    catalog: &'c JobCatalog,
    current: &Job,
    coding: u16,
    reputation: u16,
    money: i64,
) -> Vec<&'c Job> {
    let found: Vec<&Job> = catalog
        .jobs()
        .iter()
        .filter(|j| is_upward_move(current, j))
        .filter(|j| is_eligible(j, coding, reputation, money))
        .filter(|j| is_path_compatible(current, j))
        .collect();
    debug!(
        current = %current.id,
        candidates = ?found.iter().map(|j| j.id.as_str()).collect::<Vec<_>>(),
        "resolved promotions"
    );
    found
}

/// Every job needs a vetting interview except the informal entry roles.
pub fn requires_interview(job: &Job) -> bool {
    !INTERVIEW_EXEMPT.contains(&job.id.as_str())
}

/// Student moving into a real job at level 2 or above.
pub fn should_show_graduation_ceremony(current: &Job, target: &Job) -> bool {
    current.is_student() && !target.is_student() && target.level >= 2
}
