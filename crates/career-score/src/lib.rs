#![deny(warnings)]

//! Final scoring for a finished career.
//!
//! This crate provides pure helpers for:
//! - Tiered, multiplier-weighted score breakdowns
//! - Bucketed cache keys for externally generated end-of-game narratives

use career_core::{CareerPath, OutcomeReason, PlayerStats};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BASE_POINTS: u64 = 100;
/// Full efficiency bonus for a victory.
pub const MAX_EFFICIENCY_BONUS: u64 = 200;
/// Years a victory may take before the efficiency bonus decays.
pub const FAST_WIN_YEARS: u32 = 4;
/// Cap on the survival consolation bonus.
pub const MAX_SURVIVAL_BONUS: u64 = 100;
/// Width of a narrative cache bucket.
pub const NARRATIVE_BUCKET: i64 = 50;

/// Itemised score for a finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_points: u64,
    pub job_level_bonus: u64,
    pub wealth_bonus: u64,
    pub coding_bonus: u64,
    pub reputation_bonus: u64,
    pub efficiency_bonus: u64,
    pub outcome_multiplier: Decimal,
    pub total_score: u64,
}

impl ScoreBreakdown {
    /// Sum of the additive parts before the multiplier.
    pub fn subtotal(&self) -> u64 {
        self.base_points
            + self.job_level_bonus
            + self.wealth_bonus
            + self.coding_bonus
            + self.reputation_bonus
            + self.efficiency_bonus
    }
}

/// Bonus for the final job's level. Levels outside 1..=4 earn nothing.
pub fn job_level_bonus(level: u8) -> u64 {
    match level {
        1 => 50,
        2 => 150,
        3 => 300,
        4 => 500,
        _ => 0,
    }
}

/// floor(log10(money + 1) * 40); zero when broke.
///
/// Example:
/// assert_eq!(wealth_bonus(100_000), 200);
pub fn wealth_bonus(money: i64) -> u64 {
    if money <= 0 {
        return 0;
    }
    let v = ((money as f64) + 1.0).log10() * 40.0;
    v.floor() as u64
}

pub fn coding_bonus(coding: u16) -> u64 {
    u64::from(coding) * 3 / 2
}

pub fn reputation_bonus(reputation: u16) -> u64 {
    u64::from(reputation) * 2
}

/// Fast wins earn the full bonus; losses earn a small bonus for surviving.
pub fn efficiency_bonus(reason: OutcomeReason, years_played: u32) -> u64 {
    match reason {
        OutcomeReason::Victory => {
            if years_played <= FAST_WIN_YEARS {
                MAX_EFFICIENCY_BONUS
            } else {
                let penalty = u64::from(years_played - FAST_WIN_YEARS) * 10;
                MAX_EFFICIENCY_BONUS.saturating_sub(penalty)
            }
        }
        OutcomeReason::Burnout | OutcomeReason::Bankruptcy => {
            (u64::from(years_played) * 5).min(MAX_SURVIVAL_BONUS)
        }
    }
}

/// Multiplier applied to the subtotal.
pub fn outcome_multiplier(reason: OutcomeReason, special_win: bool) -> Decimal {
    match reason {
        OutcomeReason::Victory if special_win => Decimal::new(25, 1),
        OutcomeReason::Victory => Decimal::new(2, 0),
        OutcomeReason::Burnout => Decimal::new(5, 1),
        OutcomeReason::Bankruptcy => Decimal::new(3, 1),
    }
}

/// Score a finished game. Inputs are trusted to satisfy the stat bounds.
pub fn calculate_score(
    final_stats: &PlayerStats,
    reason: OutcomeReason,
    special_win: bool,
) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown {
        base_points: BASE_POINTS,
        job_level_bonus: job_level_bonus(final_stats.current_job.level),
        wealth_bonus: wealth_bonus(final_stats.money),
        coding_bonus: coding_bonus(final_stats.coding),
        reputation_bonus: reputation_bonus(final_stats.reputation),
        efficiency_bonus: efficiency_bonus(reason, final_stats.years_played()),
        outcome_multiplier: outcome_multiplier(reason, special_win),
        total_score: 0,
    };
    let weighted = Decimal::from(breakdown.subtotal()) * breakdown.outcome_multiplier;
    breakdown.total_score = weighted.floor().to_u64().unwrap_or(0);
    debug!(?reason, special_win, total = breakdown.total_score, "scored game");
    breakdown
}

/// Stable cache key for narrative text: level exact, value floored to a
/// multiple of 50.
pub fn narrative_cache_key(path: CareerPath, level: u8, score_or_weeks: i64) -> String {
    let bucket = score_or_weeks
        .div_euclid(NARRATIVE_BUCKET)
        .saturating_mul(NARRATIVE_BUCKET);
    format!("{}:L{}:{}", path.slug(), level, bucket)
}
