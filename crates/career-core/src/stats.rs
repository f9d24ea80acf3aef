//! Mutable player state and the closed set of stat deltas that act on it.

use crate::catalog::{CatalogError, Enrollment, Job, JobCatalog, JobId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const WEEKS_PER_YEAR: u8 = 52;
pub const MAX_GAUGE: u8 = 100;
pub const MAX_SKILL: u16 = 1000;
pub const STARTING_AGE: u32 = 18;
/// Length of the tracked action history.
pub const HISTORY_LEN: usize = 24;

/// Identifier of a weekly action, tracked for hidden-achievement matching.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub String);

/// Which entry point a new career starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingPlan {
    #[default]
    Hustler,
    Student,
    StudentFamilyFunded,
}

impl StartingPlan {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hustler" => Some(StartingPlan::Hustler),
            "student" => Some(StartingPlan::Student),
            "student_family_funded" | "student-family-funded" => {
                Some(StartingPlan::StudentFamilyFunded)
            }
            _ => None,
        }
    }
}

/// Partial change to the fixed stat fields. Absent fields are untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDelta {
    #[serde(default)]
    pub weeks: Option<i32>,
    #[serde(default)]
    pub stress: Option<i32>,
    #[serde(default)]
    pub energy: Option<i32>,
    #[serde(default)]
    pub money: Option<i64>,
    #[serde(default)]
    pub coding: Option<i32>,
    #[serde(default)]
    pub reputation: Option<i32>,
}

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeReason {
    Victory,
    Burnout,
    Bankruptcy,
}

impl OutcomeReason {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "victory" => Some(OutcomeReason::Victory),
            "burnout" => Some(OutcomeReason::Burnout),
            "bankruptcy" => Some(OutcomeReason::Bankruptcy),
            _ => None,
        }
    }
}

/// Full simulation state for one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Weeks left in the current year, 0..=52.
    pub weeks: u8,
    pub stress: u8,
    pub energy: u8,
    pub money: i64,
    pub coding: u16,
    pub reputation: u16,
    /// Stored by value; re-attached from the catalog by id on load.
    pub current_job: Job,
    pub age: u32,
    pub years_worked: u32,
    pub total_earned: i64,
    pub action_history: VecDeque<ActionId>,
    pub job_changes: u32,
    pub starting_job_id: JobId,
}

impl PlayerStats {
    /// Initial snapshot for the chosen entry point.
    pub fn new_game(plan: StartingPlan, catalog: &JobCatalog) -> Result<Self, CatalogError> {
        let (job, money, stress, energy, coding, reputation) = match plan {
            StartingPlan::Hustler => (catalog.starting_job()?, 5_000, 20, 80, 10, 0),
            StartingPlan::Student => (
                catalog.student_variant(Enrollment::SelfFunded)?,
                24_000,
                30,
                90,
                30,
                0,
            ),
            StartingPlan::StudentFamilyFunded => (
                catalog.student_variant(Enrollment::FamilyFunded)?,
                12_000,
                10,
                90,
                30,
                5,
            ),
        };
        Ok(Self {
            weeks: WEEKS_PER_YEAR,
            stress,
            energy,
            money,
            coding,
            reputation,
            current_job: job.clone(),
            age: STARTING_AGE,
            years_worked: 0,
            total_earned: 0,
            action_history: VecDeque::with_capacity(HISTORY_LEN),
            job_changes: 0,
            starting_job_id: job.id.clone(),
        })
    }

    /// Apply a delta, clamping every field to its bounds.
    pub fn apply(&mut self, delta: &StatDelta) {
        if let Some(d) = delta.weeks {
            self.weeks = clamp_gauge(self.weeks, d, WEEKS_PER_YEAR);
        }
        if let Some(d) = delta.stress {
            self.stress = clamp_gauge(self.stress, d, MAX_GAUGE);
        }
        if let Some(d) = delta.energy {
            self.energy = clamp_gauge(self.energy, d, MAX_GAUGE);
        }
        if let Some(d) = delta.money {
            self.money = self.money.saturating_add(d);
        }
        if let Some(d) = delta.coding {
            self.coding = clamp_skill(self.coding, d);
        }
        if let Some(d) = delta.reputation {
            self.reputation = clamp_skill(self.reputation, d);
        }
    }

    /// Push an action onto the bounded history, dropping the oldest.
    pub fn record_action(&mut self, action: ActionId) {
        if self.action_history.len() == HISTORY_LEN {
            self.action_history.pop_front();
        }
        self.action_history.push_back(action);
    }

    pub fn change_job(&mut self, job: &Job) {
        self.current_job = job.clone();
        self.job_changes += 1;
    }

    /// Years since the starting age.
    pub fn years_played(&self) -> u32 {
        self.age.saturating_sub(STARTING_AGE)
    }

    /// Force every bounded field back into range.
    pub fn clamp(&mut self) {
        self.weeks = self.weeks.min(WEEKS_PER_YEAR);
        self.stress = self.stress.min(MAX_GAUGE);
        self.energy = self.energy.min(MAX_GAUGE);
        self.coding = self.coding.min(MAX_SKILL);
        self.reputation = self.reputation.min(MAX_SKILL);
    }
}

fn clamp_gauge(value: u8, delta: i32, max: u8) -> u8 {
    (i32::from(value) + delta).clamp(0, i32::from(max)) as u8
}

fn clamp_skill(value: u16, delta: i32) -> u16 {
    (i32::from(value) + delta).clamp(0, i32::from(MAX_SKILL)) as u16
}

/// Terminal state check. Burnout wins over bankruptcy, which wins over victory.
pub fn game_outcome(stats: &PlayerStats) -> Option<OutcomeReason> {
    if stats.stress >= MAX_GAUGE {
        Some(OutcomeReason::Burnout)
    } else if stats.money <= 0 {
        Some(OutcomeReason::Bankruptcy)
    } else if stats.current_job.terminal {
        Some(OutcomeReason::Victory)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fresh(plan: StartingPlan) -> PlayerStats {
        let c = JobCatalog::builtin().unwrap();
        PlayerStats::new_game(plan, &c).unwrap()
    }

    #[test]
    fn new_game_depends_on_plan() {
        let h = fresh(StartingPlan::Hustler);
        assert_eq!(h.current_job.id.as_str(), "unemployed");
        assert_eq!(h.age, 18);
        assert_eq!(h.weeks, 52);
        let s = fresh(StartingPlan::Student);
        assert_eq!(s.current_job.id.as_str(), "cs-student");
        assert_eq!(s.starting_job_id.as_str(), "cs-student");
        let e = fresh(StartingPlan::StudentFamilyFunded);
        assert_eq!(e.current_job.id.as_str(), "cs-student-easy");
    }

    #[test]
    fn apply_clamps() {
        let mut s = fresh(StartingPlan::Hustler);
        s.apply(&StatDelta {
            stress: Some(500),
            energy: Some(-500),
            coding: Some(5_000),
            reputation: Some(-3),
            weeks: Some(10),
            money: Some(-100),
        });
        assert_eq!(s.stress, 100);
        assert_eq!(s.energy, 0);
        assert_eq!(s.coding, 1000);
        assert_eq!(s.reputation, 0);
        assert_eq!(s.weeks, 52);
        assert_eq!(s.money, 4_900);
    }

    #[test]
    fn empty_delta_is_noop() {
        let mut s = fresh(StartingPlan::Student);
        let before = s.clone();
        s.apply(&StatDelta::default());
        assert_eq!(s, before);
    }

    #[test]
    fn history_keeps_last_24() {
        let mut s = fresh(StartingPlan::Hustler);
        for i in 0..30 {
            s.record_action(ActionId(format!("a{i}")));
        }
        assert_eq!(s.action_history.len(), HISTORY_LEN);
        assert_eq!(s.action_history.front().unwrap().0, "a6");
        assert_eq!(s.action_history.back().unwrap().0, "a29");
    }

    #[test]
    fn outcome_priority() {
        let c = JobCatalog::builtin().unwrap();
        let mut s = fresh(StartingPlan::Hustler);
        assert_eq!(game_outcome(&s), None);
        s.change_job(c.get("cto").unwrap());
        assert_eq!(s.job_changes, 1);
        assert_eq!(game_outcome(&s), Some(OutcomeReason::Victory));
        s.money = 0;
        assert_eq!(game_outcome(&s), Some(OutcomeReason::Bankruptcy));
        s.stress = 100;
        assert_eq!(game_outcome(&s), Some(OutcomeReason::Burnout));
    }

    #[test]
    fn plan_parsing() {
        assert_eq!(StartingPlan::parse("student"), Some(StartingPlan::Student));
        assert_eq!(StartingPlan::parse("nope"), None);
        assert_eq!(OutcomeReason::parse("burnout"), Some(OutcomeReason::Burnout));
    }

    proptest! {
        #[test]
        fn deltas_never_escape_bounds(stress in -300i32..300, energy in -300i32..300,
                                      coding in -3000i32..3000, rep in -3000i32..3000,
                                      weeks in -100i32..100) {
            let mut s = fresh(StartingPlan::Hustler);
            s.apply(&StatDelta { weeks: Some(weeks), stress: Some(stress), energy: Some(energy),
                                 money: None, coding: Some(coding), reputation: Some(rep) });
            prop_assert!(s.stress <= 100);
            prop_assert!(s.energy <= 100);
            prop_assert!(s.coding <= 1000);
            prop_assert!(s.reputation <= 1000);
            prop_assert!(s.weeks <= 52);
        }
    }
}
