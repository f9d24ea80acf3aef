//! A single career driven through a `bevy_ecs` world.
//!
//! Each step runs a chained schedule: advance the clock, settle the year if
//! it is exhausted, apply any world event whose delay has elapsed, then check
//! for game over. Chaining keeps promotion prompts ahead of the event.

use crate::events::{EventDeck, WorldEvent};
use crate::settlement::{settle_year, PendingState, PromotionOutcome, SettlementReport};
use bevy_ecs::prelude::*;
use career_core::{
    game_outcome, requires_interview, ActionId, CatalogError, GameConfig, Job, JobCatalog,
    OutcomeReason, PlayerStats, StatDelta,
};
use career_interview::{InterviewSession, InterviewVerdict, TemplateBank};
use career_score::{calculate_score, narrative_cache_key, ScoreBreakdown};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq)]
pub enum CareerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("game is over: {0:?}")]
    GameOver(OutcomeReason),
    #[error("a promotion decision is pending")]
    DecisionPending,
    #[error("no promotion decision is pending")]
    NothingPending,
    #[error("job {0} was not offered")]
    NotOffered(String),
    #[error("no weeks left this year; step the session to settle")]
    YearExhausted,
}

/// World event queued by a settlement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub due_tick: u64,
    pub event: WorldEvent,
}

/// Plain-data state of a session, enough to rebuild it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionParts {
    pub stats: PlayerStats,
    pub pending: PendingState,
    pub deck: EventDeck,
    pub tick: u64,
    pub scheduled: Option<ScheduledEvent>,
}

#[derive(Resource)]
struct Catalog(JobCatalog);

#[derive(Resource)]
struct Player(PlayerStats);

#[derive(Resource, Default)]
struct Pending(PendingState);

#[derive(Resource)]
struct Deck(EventDeck);

#[derive(Resource)]
struct SessionRng(ChaCha8Rng);

#[derive(Resource, Default)]
struct Clock {
    tick: u64,
    event_delay_ticks: u32,
    scheduled: Option<ScheduledEvent>,
    last_report: Option<SettlementReport>,
}

#[derive(Resource, Default)]
struct Outcome(Option<OutcomeReason>);

fn advance_clock(mut clock: ResMut<Clock>) {
    clock.tick += 1;
}

fn settle_when_year_ends(
    catalog: Res<Catalog>,
    mut player: ResMut<Player>,
    mut pending: ResMut<Pending>,
    mut deck: ResMut<Deck>,
    mut rng: ResMut<SessionRng>,
    mut clock: ResMut<Clock>,
    outcome: Res<Outcome>,
) {
    // One settlement in flight at a time.
    if player.0.weeks > 0
        || !pending.0.is_none()
        || clock.scheduled.is_some()
        || outcome.0.is_some()
    {
        return;
    }
    let delay = clock.event_delay_ticks;
    let report = settle_year(&mut player.0, &catalog.0, &mut deck.0, delay, &mut rng.0);
    pending.0 = report.promotion.pending();
    let due_tick = clock.tick + u64::from(delay);
    clock.scheduled = Some(ScheduledEvent {
        due_tick,
        event: report.event.event.clone(),
    });
    clock.last_report = Some(report);
}

fn apply_due_event(mut player: ResMut<Player>, mut clock: ResMut<Clock>) {
    let due = matches!(&clock.scheduled, Some(s) if s.due_tick <= clock.tick);
    if !due {
        return;
    }
    if let Some(s) = clock.scheduled.take() {
        player.0.apply(&s.event.effect);
        info!(event = %s.event.id, tick = clock.tick, "world event applied");
    }
}

fn detect_outcome(player: Res<Player>, clock: Res<Clock>, mut outcome: ResMut<Outcome>) {
    if outcome.0.is_some() || clock.scheduled.is_some() {
        return;
    }
    if let Some(reason) = game_outcome(&player.0) {
        info!(?reason, age = player.0.age, "game over");
        outcome.0 = Some(reason);
    }
}

/// One player's career from first week to game over.
pub struct CareerSession {
    world: World,
    schedule: Schedule,
}

impl CareerSession {
    /// Start a new career for the configured entry point.
    pub fn new(config: &GameConfig, catalog: JobCatalog) -> Result<Self, CareerError> {
        let stats = PlayerStats::new_game(config.start, &catalog)?;
        let parts = SessionParts {
            stats,
            pending: PendingState::None,
            deck: EventDeck::new(config.event_mode),
            tick: 0,
            scheduled: None,
        };
        Ok(Self::from_parts(config, catalog, parts))
    }

    /// Rebuild a session from saved state. The RNG is reseeded from the
    /// config seed and the saved tick.
    pub fn from_parts(config: &GameConfig, catalog: JobCatalog, parts: SessionParts) -> Self {
        let mut world = World::new();
        let outcome = if parts.scheduled.is_none() {
            game_outcome(&parts.stats)
        } else {
            None
        };
        world.insert_resource(Catalog(catalog));
        world.insert_resource(Player(parts.stats));
        world.insert_resource(Pending(parts.pending));
        world.insert_resource(Deck(parts.deck));
        world.insert_resource(SessionRng(ChaCha8Rng::seed_from_u64(
            config.rng_seed ^ parts.tick,
        )));
        world.insert_resource(Clock {
            tick: parts.tick,
            event_delay_ticks: config.event_delay_ticks,
            scheduled: parts.scheduled,
            last_report: None,
        });
        world.insert_resource(Outcome(outcome));

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                advance_clock,
                settle_when_year_ends,
                apply_due_event,
                detect_outcome,
            )
                .chain(),
        );
        Self { world, schedule }
    }

    /// Snapshot of the plain-data state.
    pub fn parts(&self) -> SessionParts {
        let clock = self.world.resource::<Clock>();
        SessionParts {
            stats: self.stats().clone(),
            pending: self.pending().clone(),
            deck: self.world.resource::<Deck>().0.clone(),
            tick: clock.tick,
            scheduled: clock.scheduled.clone(),
        }
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.world.resource::<Player>().0
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.world.resource::<Catalog>().0
    }

    pub fn pending(&self) -> &PendingState {
        &self.world.resource::<Pending>().0
    }

    pub fn outcome(&self) -> Option<OutcomeReason> {
        self.world.resource::<Outcome>().0
    }

    pub fn tick(&self) -> u64 {
        self.world.resource::<Clock>().tick
    }

    pub fn scheduled_event(&self) -> Option<&ScheduledEvent> {
        self.world.resource::<Clock>().scheduled.as_ref()
    }

    pub fn last_settlement(&self) -> Option<&SettlementReport> {
        self.world.resource::<Clock>().last_report.as_ref()
    }

    /// Run one tick of the schedule.
    pub fn step(&mut self) {
        self.schedule.run(&mut self.world);
    }

    /// Spend one week on an action, then advance a tick. A world event still
    /// in flight lands first; if that ends the game the action is refused.
    pub fn spend_week(&mut self, action: ActionId, delta: &StatDelta) -> Result<(), CareerError> {
        self.ensure_playable()?;
        if !self.pending().is_none() {
            return Err(CareerError::DecisionPending);
        }
        if self.stats().weeks == 0 {
            return Err(CareerError::YearExhausted);
        }
        self.resolve_scheduled_event();
        self.ensure_playable()?;
        {
            let mut player = self.world.resource_mut::<Player>();
            debug!(action = %action.0, "spending week");
            player.0.apply(delta);
            player.0.weeks = player.0.weeks.saturating_sub(1);
            player.0.record_action(action);
        }
        self.step();
        Ok(())
    }

    /// Pick one of the offered jobs. Vetted jobs move to a pending interview.
    pub fn choose_job(&mut self, id: &str) -> Result<PromotionOutcome, CareerError> {
        self.ensure_playable()?;
        let job = match self.pending() {
            PendingState::Selection { jobs } => jobs
                .iter()
                .find(|j| j.id.as_str() == id)
                .cloned()
                .ok_or_else(|| CareerError::NotOffered(id.to_string()))?,
            PendingState::Interview { .. } => return Err(CareerError::DecisionPending),
            PendingState::None => return Err(CareerError::NothingPending),
        };
        if requires_interview(&job) {
            self.world.resource_mut::<Pending>().0 = PendingState::Interview { job: job.clone() };
            return Ok(PromotionOutcome::InterviewRequired(job));
        }
        self.promote(&job);
        Ok(PromotionOutcome::Promoted(job))
    }

    /// Generate the interview for the pending offer.
    pub fn start_interview(&mut self, bank: &TemplateBank) -> Result<InterviewSession, CareerError> {
        let job = self.pending_interview_job()?;
        let mut rng = self.world.resource_mut::<SessionRng>();
        Ok(InterviewSession::start(bank, &job, &mut rng.0))
    }

    /// Close the pending interview. `None` means the player cancelled: no
    /// promotion and no penalty. Returns whether the player was promoted.
    pub fn complete_interview(
        &mut self,
        verdict: Option<&InterviewVerdict>,
    ) -> Result<bool, CareerError> {
        let job = self.pending_interview_job()?;
        let passed = match verdict {
            Some(v) if v.job_id != job.id => return Err(CareerError::NotOffered(v.job_id.0.clone())),
            Some(v) => v.passed,
            None => false,
        };
        if passed {
            self.promote(&job);
        } else {
            info!(job = %job.id, cancelled = verdict.is_none(), "offer not taken");
            self.world.resource_mut::<Pending>().0 = PendingState::None;
        }
        Ok(passed)
    }

    /// Score for a finished game.
    pub fn final_score(&self, special_win: bool) -> Option<ScoreBreakdown> {
        self.outcome()
            .map(|reason| calculate_score(self.stats(), reason, special_win))
    }

    /// Cache key for the end-of-game narrative.
    pub fn narrative_key(&self, special_win: bool) -> Option<String> {
        let score = self.final_score(special_win)?;
        let job = &self.stats().current_job;
        let value = i64::try_from(score.total_score).unwrap_or(i64::MAX);
        Some(narrative_cache_key(job.path, job.level, value))
    }

    fn pending_interview_job(&self) -> Result<Job, CareerError> {
        match self.pending() {
            PendingState::Interview { job } => Ok(job.clone()),
            PendingState::Selection { .. } => Err(CareerError::DecisionPending),
            PendingState::None => Err(CareerError::NothingPending),
        }
    }

    fn promote(&mut self, job: &Job) {
        self.world.resource_mut::<Player>().0.change_job(job);
        self.world.resource_mut::<Pending>().0 = PendingState::None;
        info!(job = %job.id, "promoted");
        let scheduled = self.world.resource::<Clock>().scheduled.is_some();
        if !scheduled {
            if let Some(reason) = game_outcome(self.stats()) {
                self.world.resource_mut::<Outcome>().0 = Some(reason);
            }
        }
    }

    /// Tick until the queued event has landed. Settlement cannot start while
    /// one is queued, so this only moves the clock.
    fn resolve_scheduled_event(&mut self) {
        while self.scheduled_event().is_some() {
            self.step();
        }
    }

    fn ensure_playable(&self) -> Result<(), CareerError> {
        match self.outcome() {
            Some(reason) => Err(CareerError::GameOver(reason)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::standard_events;
    use career_core::{EventMode, JobId, StartingPlan};
    use career_interview::SessionState;

    fn session(start: StartingPlan) -> CareerSession {
        let cfg = GameConfig {
            start,
            ..GameConfig::default()
        };
        CareerSession::new(&cfg, JobCatalog::builtin().unwrap()).unwrap()
    }

    fn idle() -> StatDelta {
        StatDelta::default()
    }

    fn restored(
        stats: PlayerStats,
        pending: PendingState,
        tick: u64,
        scheduled: Option<ScheduledEvent>,
    ) -> CareerSession {
        let parts = SessionParts {
            stats,
            pending,
            deck: EventDeck::new(EventMode::Rotating),
            tick,
            scheduled,
        };
        CareerSession::from_parts(&GameConfig::default(), JobCatalog::builtin().unwrap(), parts)
    }

    fn boom(due_tick: u64) -> Option<ScheduledEvent> {
        Some(ScheduledEvent {
            due_tick,
            event: standard_events()[0].clone(),
        })
    }

    fn finish_year(s: &mut CareerSession, delta: &StatDelta) {
        while s.stats().weeks > 0 {
            s.spend_week(ActionId("study".into()), delta).unwrap();
        }
    }

    #[test]
    fn year_end_settles_once() {
        let mut s = session(StartingPlan::Hustler);
        finish_year(&mut s, &idle());
        assert_eq!(s.stats().weeks, 52);
        assert_eq!(s.stats().age, 19);
        assert_eq!(s.stats().years_worked, 1);
        assert!(s.scheduled_event().is_some());
        assert_eq!(s.tick(), 52);
    }

    #[test]
    fn event_applies_after_delay() {
        let mut s = session(StartingPlan::Hustler);
        finish_year(&mut s, &idle());
        // Hustler start: 5000 - 6000 rent, rotating deck deals the boom first.
        assert_eq!(s.stats().money, -1_000);
        assert_eq!(s.outcome(), None);
        s.step();
        assert!(s.scheduled_event().is_none());
        assert_eq!(s.stats().money, 2_000);
        assert_eq!(s.outcome(), None);
    }

    #[test]
    fn running_out_of_money_is_bankruptcy() {
        let cfg = GameConfig {
            event_mode: EventMode::Rotating,
            ..GameConfig::default()
        };
        let mut s = CareerSession::new(&cfg, JobCatalog::builtin().unwrap()).unwrap();
        let broke = StatDelta {
            money: Some(-200),
            ..StatDelta::default()
        };
        // 5000 starting money runs dry on the 25th week.
        for _ in 0..25 {
            s.spend_week(ActionId("party".into()), &broke).unwrap();
        }
        assert_eq!(s.stats().money, 0);
        assert_eq!(s.outcome(), Some(OutcomeReason::Bankruptcy));
        assert!(matches!(
            s.spend_week(ActionId("x".into()), &idle()),
            Err(CareerError::GameOver(OutcomeReason::Bankruptcy))
        ));
        assert!(s.final_score(false).is_some());
        assert!(s.narrative_key(false).unwrap().starts_with("hustler:L0:"));
    }

    #[test]
    fn debt_at_year_end_waits_for_the_event() {
        let mut s = session(StartingPlan::Hustler);
        finish_year(&mut s, &idle());
        assert!(s.stats().money <= 0);
        assert_eq!(s.outcome(), None);
    }

    #[test]
    fn pending_decision_blocks_settlement() {
        let c = JobCatalog::builtin().unwrap();
        let mut stats = PlayerStats::new_game(StartingPlan::Hustler, &c).unwrap();
        stats.weeks = 0;
        let age = stats.age;
        let offer = PendingState::Selection {
            jobs: vec![c.get("gig-worker").unwrap().clone()],
        };
        let mut s = restored(stats, offer.clone(), 10, None);
        s.step();
        assert_eq!(s.stats().age, age);
        assert_eq!(s.stats().weeks, 0);
        assert_eq!(s.pending(), &offer);
        assert!(s.scheduled_event().is_none());
    }

    #[test]
    fn queued_event_blocks_settlement() {
        let c = JobCatalog::builtin().unwrap();
        let mut stats = PlayerStats::new_game(StartingPlan::Hustler, &c).unwrap();
        stats.weeks = 0;
        let age = stats.age;
        let mut s = restored(stats, PendingState::None, 10, boom(100));
        s.step();
        assert_eq!(s.tick(), 11);
        assert_eq!(s.stats().age, age);
        assert_eq!(s.stats().years_worked, 0);
        assert_eq!(s.scheduled_event().map(|e| e.due_tick), Some(100));
        assert!(s.pending().is_none());
    }

    #[test]
    fn reaching_the_top_before_the_event_lands_ends_the_game() {
        let c = JobCatalog::builtin().unwrap();
        let mut stats = PlayerStats::new_game(StartingPlan::Hustler, &c).unwrap();
        stats.current_job = c.get("eng-manager").unwrap().clone();
        stats.money = 50_000;
        let stress = stats.stress;
        let interview = PendingState::Interview {
            job: c.get("cto").unwrap().clone(),
        };
        let mut s = restored(stats, interview, 52, boom(53));
        let verdict = InterviewVerdict {
            job_id: JobId::new("cto"),
            correct: 3,
            total: 3,
            passed: true,
        };
        assert!(s.complete_interview(Some(&verdict)).unwrap());
        assert_eq!(s.outcome(), None);

        let stressful = StatDelta {
            stress: Some(5),
            ..StatDelta::default()
        };
        assert_eq!(
            s.spend_week(ActionId("overtime".into()), &stressful),
            Err(CareerError::GameOver(OutcomeReason::Victory))
        );
        assert!(s.scheduled_event().is_none());
        assert_eq!(s.stats().money, 53_000);
        assert_eq!(s.stats().weeks, 52);
        assert_eq!(s.stats().stress, stress);
        assert!(s.stats().action_history.is_empty());
    }

    #[test]
    fn queued_event_lands_before_the_next_week() {
        let mut s = session(StartingPlan::Hustler);
        finish_year(&mut s, &idle());
        assert_eq!(s.stats().money, -1_000);
        s.spend_week(ActionId("study".into()), &idle()).unwrap();
        assert!(s.scheduled_event().is_none());
        assert_eq!(s.stats().money, 2_000);
        assert_eq!(s.stats().weeks, 51);
        assert_eq!(s.tick(), 54);
        assert_eq!(s.outcome(), None);
    }

    #[test]
    fn burnout_ends_the_game() {
        let mut s = session(StartingPlan::Hustler);
        let grind = StatDelta {
            stress: Some(100),
            ..StatDelta::default()
        };
        s.spend_week(ActionId("grind".into()), &grind).unwrap();
        assert_eq!(s.outcome(), Some(OutcomeReason::Burnout));
        let score = s.final_score(false).unwrap();
        assert_eq!(score.efficiency_bonus, 0);
    }

    #[test]
    fn selection_then_interview_then_promotion() {
        let mut s = session(StartingPlan::Hustler);
        let study = StatDelta {
            coding: Some(6),
            reputation: Some(2),
            money: Some(200),
            ..StatDelta::default()
        };
        finish_year(&mut s, &study);
        // 10 + 52*6 coding, 104 reputation: gig work and freelancing both open.
        assert!(matches!(s.pending(), PendingState::Selection { jobs } if jobs.len() == 2));
        assert_eq!(
            s.spend_week(ActionId("x".into()), &idle()),
            Err(CareerError::DecisionPending)
        );
        assert!(matches!(
            s.choose_job("cto"),
            Err(CareerError::NotOffered(_))
        ));
        let out = s.choose_job("freelancer").unwrap();
        assert!(matches!(out, PromotionOutcome::InterviewRequired(_)));

        let bank = TemplateBank::builtin().unwrap();
        let mut interview = s.start_interview(&bank).unwrap();
        while let SessionState::AskingQuestion(_) = interview.state() {
            let idx = interview.current_question().unwrap().correct_index;
            interview.answer(idx).unwrap();
            interview.advance().unwrap();
        }
        let verdict = interview.verdict().unwrap();
        assert!(s.complete_interview(Some(&verdict)).unwrap());
        assert_eq!(s.stats().current_job.id.as_str(), "freelancer");
        assert_eq!(s.stats().job_changes, 1);
        assert!(s.pending().is_none());
    }

    #[test]
    fn exempt_choice_promotes_directly() {
        let mut s = session(StartingPlan::Hustler);
        let study = StatDelta {
            coding: Some(6),
            reputation: Some(2),
            money: Some(200),
            ..StatDelta::default()
        };
        finish_year(&mut s, &study);
        let out = s.choose_job("gig-worker").unwrap();
        assert!(matches!(out, PromotionOutcome::Promoted(ref j) if j.id.as_str() == "gig-worker"));
        assert!(s.pending().is_none());
    }

    #[test]
    fn cancelled_interview_is_not_a_fail() {
        let mut s = session(StartingPlan::Hustler);
        let study = StatDelta {
            coding: Some(6),
            reputation: Some(2),
            money: Some(200),
            ..StatDelta::default()
        };
        finish_year(&mut s, &study);
        s.choose_job("freelancer").unwrap();
        assert!(!s.complete_interview(None).unwrap());
        assert!(s.pending().is_none());
        assert_eq!(s.stats().current_job.id.as_str(), "unemployed");
        assert_eq!(s.stats().job_changes, 0);
        assert_eq!(s.complete_interview(None), Err(CareerError::NothingPending));
    }

    #[test]
    fn parts_round_trip() {
        let mut s = session(StartingPlan::Student);
        s.spend_week(ActionId("study".into()), &idle()).unwrap();
        let parts = s.parts();
        let back = CareerSession::from_parts(
            &GameConfig::default(),
            JobCatalog::builtin().unwrap(),
            parts.clone(),
        );
        assert_eq!(back.parts(), parts);
        assert_eq!(back.stats().weeks, 51);
    }
}
