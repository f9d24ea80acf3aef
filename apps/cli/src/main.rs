#![deny(warnings)]

//! Headless CLI: inspect the job catalog, generate interviews, score final
//! states and autoplay seeded careers.

use anyhow::{anyhow, bail, Context, Result};
use career_core::{
    should_show_graduation_ceremony, ActionId, GameConfig, JobCatalog, OutcomeReason,
    PlayerStats, StartingPlan, StatDelta,
};
use career_interview::{InterviewSession, SessionState, TemplateBank};
use career_runtime::{CareerError, CareerSession, PendingState};
use career_score::{calculate_score, narrative_cache_key};
use persistence::{read_save, write_save, SaveSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

const DEFAULT_YEARS: u32 = 40;

#[derive(Debug, Default)]
struct Args {
    command: Option<String>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    years: Option<u32>,
    start: Option<String>,
    job: Option<String>,
    level: Option<u8>,
    money: Option<i64>,
    coding: Option<u16>,
    reputation: Option<u16>,
    age: Option<u32>,
    outcome: Option<String>,
    special: bool,
    save: Option<PathBuf>,
    resume: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--years" => args.years = it.next().and_then(|s| s.parse().ok()),
            "--start" => args.start = it.next(),
            "--job" => args.job = it.next(),
            "--level" => args.level = it.next().and_then(|s| s.parse().ok()),
            "--money" => args.money = it.next().and_then(|s| s.parse().ok()),
            "--coding" => args.coding = it.next().and_then(|s| s.parse().ok()),
            "--reputation" => args.reputation = it.next().and_then(|s| s.parse().ok()),
            "--age" => args.age = it.next().and_then(|s| s.parse().ok()),
            "--outcome" => args.outcome = it.next(),
            "--special" => args.special = true,
            "--save" => args.save = it.next().map(PathBuf::from),
            "--resume" => args.resume = it.next().map(PathBuf::from),
            cmd if args.command.is_none() && !cmd.starts_with("--") => {
                args.command = Some(cmd.to_string())
            }
            _ => {}
        }
    }
    args
}

/// Config file first, then individual flags on top.
fn load_config(args: &Args) -> Result<GameConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            GameConfig::from_yaml_str(&text)?
        }
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.rng_seed = seed;
    }
    if let Some(start) = &args.start {
        cfg.start =
            StartingPlan::parse(start).ok_or_else(|| anyhow!("unknown start plan: {start}"))?;
    }
    Ok(cfg)
}

fn print_catalog(catalog: &JobCatalog) {
    for job in catalog.jobs() {
        let money = job
            .requirements
            .money
            .map(|m| format!(" money>={m}"))
            .unwrap_or_default();
        println!(
            "{:<22} {:<11} L{} | coding>={} rep>={}{} | pay {} rent {}{}{}",
            job.id.as_str(),
            job.path.slug(),
            job.level,
            job.requirements.coding,
            job.requirements.reputation,
            money,
            job.yearly_pay,
            job.rent_per_year,
            if job.terminal { " | terminal" } else { "" },
            if job.starting { " | start" } else { "" },
        );
    }
}

fn print_interview(catalog: &JobCatalog, bank: &TemplateBank, args: &Args) -> Result<()> {
    let id = args.job.as_deref().ok_or_else(|| anyhow!("interview needs --job <id>"))?;
    let job = catalog.require(id)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed.unwrap_or_default());
    let session = InterviewSession::start(bank, job, &mut rng);
    println!("Interview for {} ({} L{})", job.title, job.path, job.level);
    for (n, q) in session.questions().iter().enumerate() {
        println!("\nQ{}: {}", n + 1, q.question);
        for (i, opt) in q.options.iter().enumerate() {
            let mark = if i == q.correct_index { "*" } else { " " };
            println!("  {mark} {}) {opt}", i + 1);
        }
        println!("  -> {}", q.explanation);
    }
    Ok(())
}

fn print_score(catalog: &JobCatalog, args: &Args) -> Result<()> {
    let level = args.level.unwrap_or(0);
    let job = catalog
        .jobs()
        .iter()
        .find(|j| j.level == level)
        .ok_or_else(|| anyhow!("no job at level {level}"))?;
    let outcome = args.outcome.as_deref().unwrap_or("victory");
    let reason =
        OutcomeReason::parse(outcome).ok_or_else(|| anyhow!("unknown outcome: {outcome}"))?;
    let mut stats = PlayerStats::new_game(StartingPlan::Hustler, catalog)?;
    stats.current_job = job.clone();
    stats.money = args.money.unwrap_or(0);
    stats.coding = args.coding.unwrap_or(0);
    stats.reputation = args.reputation.unwrap_or(0);
    stats.age = args.age.unwrap_or(stats.age);
    let b = calculate_score(&stats, reason, args.special);
    println!(
        "base {} | level {} | wealth {} | coding {} | rep {} | efficiency {} | x{} => {}",
        b.base_points,
        b.job_level_bonus,
        b.wealth_bonus,
        b.coding_bonus,
        b.reputation_bonus,
        b.efficiency_bonus,
        b.outcome_multiplier,
        b.total_score
    );
    let value = i64::try_from(b.total_score).unwrap_or(i64::MAX);
    println!("narrative key: {}", narrative_cache_key(job.path, job.level, value));
    Ok(())
}

/// Autopilot: rest when worn out, earn when broke, otherwise study with a
/// networking week every third week.
fn weekly_policy(stats: &PlayerStats) -> (ActionId, StatDelta) {
    if stats.stress >= 70 || stats.energy < 30 {
        let rest = StatDelta {
            stress: Some(-8),
            energy: Some(12),
            ..StatDelta::default()
        };
        return (ActionId("rest".into()), rest);
    }
    if stats.money < 2_000 {
        let gig = StatDelta {
            money: Some(400),
            stress: Some(3),
            energy: Some(-4),
            ..StatDelta::default()
        };
        return (ActionId("side-gig".into()), gig);
    }
    if stats.weeks % 3 == 0 {
        let network = StatDelta {
            reputation: Some(4),
            stress: Some(2),
            energy: Some(-3),
            money: Some(-100),
            ..StatDelta::default()
        };
        (ActionId("network".into()), network)
    } else {
        let study = StatDelta {
            coding: Some(5),
            stress: Some(2),
            energy: Some(-3),
            money: Some(-50),
            ..StatDelta::default()
        };
        (ActionId("study".into()), study)
    }
}

fn sit_interview(
    session: &mut CareerSession,
    bank: &TemplateBank,
    rng: &mut ChaCha8Rng,
) -> Result<bool> {
    let mut interview = session.start_interview(bank)?;
    let skill = (0.4 + f64::from(session.stats().coding) / 2_000.0).min(0.95);
    while let SessionState::AskingQuestion(_) = interview.state() {
        let q = interview
            .current_question()
            .ok_or_else(|| anyhow!("interview lost its question"))?;
        let pick = if rng.gen_bool(skill) {
            q.correct_index
        } else {
            (q.correct_index + 1) % q.options.len()
        };
        interview.answer(pick)?;
        interview.advance()?;
    }
    let verdict = interview.verdict()?;
    Ok(session.complete_interview(Some(&verdict))?)
}

fn simulate(catalog: JobCatalog, bank: &TemplateBank, args: &Args) -> Result<()> {
    let cfg = load_config(args)?;
    let years = args.years.unwrap_or(DEFAULT_YEARS);
    let mut session = match &args.resume {
        Some(path) => {
            let parts = read_save(path)?.restore(&catalog)?;
            CareerSession::from_parts(&cfg, catalog, parts)
        }
        None => CareerSession::new(&cfg, catalog)?,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.rng_seed.wrapping_add(1));
    info!(seed = cfg.rng_seed, start = ?cfg.start, years, "simulating");

    while session.outcome().is_none() && session.stats().years_played() < years {
        let before = session.stats().current_job.clone();
        match session.pending().clone() {
            PendingState::Selection { jobs } => {
                let best = jobs
                    .iter()
                    .max_by_key(|j| j.yearly_pay)
                    .ok_or_else(|| anyhow!("empty selection"))?;
                session.choose_job(best.id.as_str())?;
            }
            PendingState::Interview { job } => {
                let passed = sit_interview(&mut session, bank, &mut rng)?;
                let verdict = if passed { "passed" } else { "failed" };
                println!("age {} | interview for {}: {verdict}", session.stats().age, job.id);
            }
            PendingState::None if session.stats().weeks == 0 => session.step(),
            PendingState::None => {
                let (action, delta) = weekly_policy(session.stats());
                match session.spend_week(action, &delta) {
                    // The queued event decided the game; the loop exits on the outcome.
                    Ok(()) | Err(CareerError::GameOver(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        let after = &session.stats().current_job;
        if after.id != before.id {
            let note = if should_show_graduation_ceremony(&before, after) {
                " (graduated)"
            } else {
                ""
            };
            println!("age {} | {} -> {}{note}", session.stats().age, before.id, after.id);
        }
    }

    let s = session.stats();
    println!(
        "age {} | job {} | money {} | coding {} | rep {} | stress {} | job changes {}",
        s.age, s.current_job.id, s.money, s.coding, s.reputation, s.stress, s.job_changes
    );
    match (session.outcome(), session.final_score(args.special)) {
        (Some(reason), Some(score)) => {
            println!("outcome {:?} | score {}", reason, score.total_score);
            if let Some(key) = session.narrative_key(args.special) {
                println!("narrative key: {key}");
            }
        }
        _ => println!("no outcome after {years} years"),
    }
    if let Some(path) = &args.save {
        write_save(path, &SaveSnapshot::capture(session.parts()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(command = ?args.command, git_sha = env!("GIT_SHA"), "starting CLI");

    let catalog = JobCatalog::builtin()?;
    let bank = TemplateBank::builtin()?;

    match args.command.as_deref() {
        Some("catalog") => print_catalog(&catalog),
        Some("interview") => print_interview(&catalog, &bank, &args)?,
        Some("score") => print_score(&catalog, &args)?,
        Some("simulate") | None => simulate(catalog, &bank, &args)?,
        Some(other) => bail!("unknown command: {other} (catalog | interview | score | simulate)"),
    }
    Ok(())
}
