//! Year-end settlement: pay, rent, aging, promotion check, world event.

use crate::events::{EventDeck, WorldEvent};
use career_core::{
    available_promotions, requires_interview, Job, JobCatalog, PlayerStats, WEEKS_PER_YEAR,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Promotion decision waiting on the player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingState {
    #[default]
    None,
    /// A single offer that needs a passed interview.
    Interview { job: Job },
    /// Several offers; the player must pick one.
    Selection { jobs: Vec<Job> },
}

impl PendingState {
    pub fn is_none(&self) -> bool {
        matches!(self, PendingState::None)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionOutcome {
    /// No eligible job this cycle.
    Unchanged,
    Promoted(Job),
    InterviewRequired(Job),
    SelectionRequired(Vec<Job>),
}

impl PromotionOutcome {
    pub fn pending(&self) -> PendingState {
        match self {
            PromotionOutcome::InterviewRequired(job) => PendingState::Interview { job: job.clone() },
            PromotionOutcome::SelectionRequired(jobs) => PendingState::Selection { jobs: jobs.clone() },
            PromotionOutcome::Unchanged | PromotionOutcome::Promoted(_) => PendingState::None,
        }
    }
}

/// World event to apply once `delay_ticks` have passed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredEvent {
    pub event: WorldEvent,
    pub delay_ticks: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub pay: i64,
    pub rent: i64,
    pub age: u32,
    pub promotion: PromotionOutcome,
    pub event: DeferredEvent,
}

/// Decide what happens with the current promotion candidates.
pub fn resolve_promotion(stats: &PlayerStats, catalog: &JobCatalog) -> PromotionOutcome {
    let candidates = available_promotions(
        catalog,
        &stats.current_job,
        stats.coding,
        stats.reputation,
        stats.money,
    );
    match candidates.as_slice() {
        [] => PromotionOutcome::Unchanged,
        [only] if requires_interview(only) => PromotionOutcome::InterviewRequired((*only).clone()),
        [only] => PromotionOutcome::Promoted((*only).clone()),
        many => PromotionOutcome::SelectionRequired(many.iter().map(|j| (*j).clone()).collect()),
    }
}

/// Run the year-end batch. Every call re-runs the whole sequence; callers
/// fire it once per exhausted year.
pub fn settle_year<R: Rng + ?Sized>(
    stats: &mut PlayerStats,
    catalog: &JobCatalog,
    deck: &mut EventDeck,
    delay_ticks: u32,
    rng: &mut R,
) -> SettlementReport {
    let pay = stats.current_job.yearly_pay;
    let rent = stats.current_job.rent_per_year;
    stats.money = stats.money.saturating_add(pay);
    stats.money = stats.money.saturating_sub(rent);

    stats.age += 1;
    stats.years_worked += 1;
    // Tuition never reduces lifetime earnings.
    stats.total_earned = stats.total_earned.saturating_add(pay.max(0));
    stats.weeks = WEEKS_PER_YEAR;

    let promotion = resolve_promotion(stats, catalog);
    if let PromotionOutcome::Promoted(job) = &promotion {
        stats.change_job(job);
    }

    // Rolled only after the promotion outcome is fixed.
    let event = deck.draw(rng);
    info!(
        age = stats.age,
        pay,
        rent,
        money = stats.money,
        job = %stats.current_job.id,
        promotion = %promotion_label(&promotion),
        event = %event.id,
        "year settled"
    );
    SettlementReport {
        pay,
        rent,
        age: stats.age,
        promotion,
        event: DeferredEvent { event, delay_ticks },
    }
}

fn promotion_label(p: &PromotionOutcome) -> String {
    match p {
        PromotionOutcome::Unchanged => "unchanged".to_string(),
        PromotionOutcome::Promoted(j) => format!("promoted:{}", j.id),
        PromotionOutcome::InterviewRequired(j) => format!("interview:{}", j.id),
        PromotionOutcome::SelectionRequired(js) => format!("select:{}", js.len()),
    }
}
