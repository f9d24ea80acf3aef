//! The job catalog: every node of the career graph, in scan order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Unique identifier for a job, e.g. "junior-dev", "cto".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        JobId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Career tracks. A job belongs to exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerPath {
    /// Traditional employment, including the student entry roles.
    Corporate,
    /// Independent work: gigs and freelancing.
    Hustler,
    /// Engineering management.
    Management,
    /// Individual contributor / technical expert.
    Expert,
    /// Entrepreneurial track.
    Founder,
    /// Advanced specialist consulting.
    Consultant,
}

/// All paths in declaration order.
pub const ALL_PATHS: [CareerPath; 6] = [
    CareerPath::Corporate,
    CareerPath::Hustler,
    CareerPath::Management,
    CareerPath::Expert,
    CareerPath::Founder,
    CareerPath::Consultant,
];

impl CareerPath {
    /// Stable lowercase name, used in cache keys and data files.
    pub fn slug(self) -> &'static str {
        match self {
            CareerPath::Corporate => "corporate",
            CareerPath::Hustler => "hustler",
            CareerPath::Management => "management",
            CareerPath::Expert => "expert",
            CareerPath::Founder => "founder",
            CareerPath::Consultant => "consultant",
        }
    }
}

impl fmt::Display for CareerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// How a student role is financed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enrollment {
    /// Pays full tuition out of pocket.
    SelfFunded,
    /// Family covers most of the cost.
    FamilyFunded,
}

/// Minimum stats a player needs to take a job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub coding: u16,
    pub reputation: u16,
    /// Cash on hand required; `None` means no money gate.
    pub money: Option<i64>,
}

/// A node in the career graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub path: CareerPath,
    /// Seniority tier 1..=4. Level 0 is reserved for the starting entry.
    pub level: u8,
    pub requirements: Requirements,
    /// Signed: student roles pay tuition.
    pub yearly_pay: i64,
    pub rent_per_year: i64,
    /// Reaching this job wins the game.
    pub terminal: bool,
    /// UI grouping only.
    pub intermediate: bool,
    /// The "no job" state new hustler careers start in.
    pub starting: bool,
    pub enrollment: Option<Enrollment>,
    /// Downstream paths this node forks into besides its own.
    pub bridges_to: Vec<CareerPath>,
}

impl Job {
    pub fn is_student(&self) -> bool {
        self.enrollment.is_some()
    }

    pub fn bridges(&self, path: CareerPath) -> bool {
        self.bridges_to.contains(&path)
    }

    fn entry(id: &str, title: &str, path: CareerPath, level: u8) -> Self {
        Job {
            id: JobId::new(id),
            title: title.to_string(),
            path,
            level,
            requirements: Requirements::default(),
            yearly_pay: 0,
            rent_per_year: 0,
            terminal: false,
            intermediate: false,
            starting: false,
            enrollment: None,
            bridges_to: Vec::new(),
        }
    }

    fn requires(mut self, coding: u16, reputation: u16) -> Self {
        self.requirements.coding = coding;
        self.requirements.reputation = reputation;
        self
    }

    fn requires_money(mut self, money: i64) -> Self {
        self.requirements.money = Some(money);
        self
    }

    fn pays(mut self, yearly_pay: i64, rent_per_year: i64) -> Self {
        self.yearly_pay = yearly_pay;
        self.rent_per_year = rent_per_year;
        self
    }

    fn enrolled(mut self, enrollment: Enrollment) -> Self {
        self.enrollment = Some(enrollment);
        self
    }

    fn bridging(mut self, paths: &[CareerPath]) -> Self {
        self.bridges_to = paths.to_vec();
        self
    }

    fn flagged_terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    fn flagged_intermediate(mut self) -> Self {
        self.intermediate = true;
        self
    }

    fn flagged_starting(mut self) -> Self {
        self.starting = true;
        self
    }
}

/// Informal entry roles taken without an assessment.
pub const INTERVIEW_EXEMPT: [&str; 5] = [
    "unemployed",
    "gig-worker",
    "intern",
    "cs-student",
    "cs-student-easy",
];

/// Catalog integrity errors. Any of these aborts startup.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog is empty")]
    Empty,
    #[error("duplicate job id: {0}")]
    DuplicateId(String),
    #[error("job {id} has level {level}, expected 1..=4 (0 only for the starting entry)")]
    LevelOutOfRange { id: String, level: u8 },
    #[error("no starting job flagged in catalog")]
    MissingStartingJob,
    #[error("more than one starting job flagged: {0}")]
    MultipleStartingJobs(String),
    #[error("starting job {0} must be the level-0 hustler entry")]
    MisplacedStartingJob(String),
    #[error("no {0:?} student variant in catalog")]
    MissingStudentVariant(Enrollment),
    #[error("terminal job {0} is unreachable from its path")]
    UnreachableTerminal(String),
    #[error("job {0} bridges into its own path")]
    SelfBridge(String),
    #[error("unknown job id: {0}")]
    UnknownJob(String),
}

/// Immutable, ordered job table.
#[derive(Clone, Debug)]
pub struct JobCatalog {
    jobs: Vec<Job>,
}

impl JobCatalog {
    /// Build a catalog, rejecting any table that breaks the graph invariants.
    pub fn new(jobs: Vec<Job>) -> Result<Self, CatalogError> {
        validate_jobs(&jobs)?;
        Ok(Self { jobs })
    }

    /// The shipped career graph.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin_jobs())
    }

    /// Jobs in catalog order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id.0 == id)
    }

    /// Lookup that treats a missing id as an error.
    pub fn require(&self, id: &str) -> Result<&Job, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::UnknownJob(id.to_string()))
    }

    /// Index of a job within catalog order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.jobs.iter().position(|j| j.id.0 == id)
    }

    /// The hustler-path "no job" entry.
    pub fn starting_job(&self) -> Result<&Job, CatalogError> {
        self.jobs
            .iter()
            .find(|j| j.starting)
            .ok_or(CatalogError::MissingStartingJob)
    }

    pub fn student_variant(&self, enrollment: Enrollment) -> Result<&Job, CatalogError> {
        self.jobs
            .iter()
            .find(|j| j.enrollment == Some(enrollment))
            .ok_or(CatalogError::MissingStudentVariant(enrollment))
    }
}

fn validate_jobs(jobs: &[Job]) -> Result<(), CatalogError> {
    if jobs.is_empty() {
        return Err(CatalogError::Empty);
    }
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for j in jobs {
        if !ids.insert(j.id.as_str()) {
            return Err(CatalogError::DuplicateId(j.id.0.clone()));
        }
        if j.starting && (j.level != 0 || j.path != CareerPath::Hustler) {
            return Err(CatalogError::MisplacedStartingJob(j.id.0.clone()));
        }
        if !j.starting && !(1..=4).contains(&j.level) {
            return Err(CatalogError::LevelOutOfRange {
                id: j.id.0.clone(),
                level: j.level,
            });
        }
        if j.bridges(j.path) {
            return Err(CatalogError::SelfBridge(j.id.0.clone()));
        }
    }
    let mut starting = jobs.iter().filter(|j| j.starting);
    if starting.next().is_none() {
        return Err(CatalogError::MissingStartingJob);
    }
    if let Some(extra) = starting.next() {
        return Err(CatalogError::MultipleStartingJobs(extra.id.0.clone()));
    }
    for enrollment in [Enrollment::SelfFunded, Enrollment::FamilyFunded] {
        if !jobs.iter().any(|j| j.enrollment == Some(enrollment)) {
            return Err(CatalogError::MissingStudentVariant(enrollment));
        }
    }
    for t in jobs.iter().filter(|j| j.terminal) {
        let reachable = jobs
            .iter()
            .any(|j| !j.terminal && j.path == t.path && j.level <= t.level);
        if !reachable {
            return Err(CatalogError::UnreachableTerminal(t.id.0.clone()));
        }
    }
    Ok(())
}

fn builtin_jobs() -> Vec<Job> {
    use CareerPath::*;
    vec![
        Job::entry("unemployed", "Between Jobs", Hustler, 0)
            .pays(0, 6_000)
            .flagged_starting(),
        Job::entry("gig-worker", "Gig Worker", Hustler, 1)
            .requires(40, 0)
            .pays(14_000, 6_000),
        Job::entry("cs-student", "CS Student", Corporate, 1)
            .pays(-18_000, 7_000)
            .enrolled(Enrollment::SelfFunded),
        Job::entry("cs-student-easy", "CS Student (Family Funded)", Corporate, 1)
            .pays(-4_000, 2_000)
            .enrolled(Enrollment::FamilyFunded),
        Job::entry("intern", "Software Intern", Corporate, 1)
            .requires(120, 20)
            .pays(20_000, 8_000),
        Job::entry("junior-dev", "Junior Developer", Corporate, 2)
            .requires(250, 50)
            .pays(48_000, 12_000),
        Job::entry("mid-dev", "Developer", Corporate, 2)
            .requires(380, 120)
            .pays(68_000, 14_000)
            .flagged_intermediate(),
        Job::entry("senior-dev", "Senior Developer", Corporate, 3)
            .requires(520, 220)
            .pays(95_000, 18_000)
            .bridging(&[Management, Expert]),
        Job::entry("freelancer", "Freelance Developer", Hustler, 2)
            .requires(220, 80)
            .pays(42_000, 10_000)
            .bridging(&[Founder, Consultant]),
        Job::entry("eng-manager", "Engineering Manager", Management, 3)
            .requires(480, 420)
            .pays(120_000, 20_000),
        Job::entry("staff-engineer", "Staff Engineer", Expert, 3)
            .requires(720, 300)
            .pays(130_000, 20_000),
        Job::entry("startup-founder", "Startup Founder", Founder, 3)
            .requires(420, 300)
            .requires_money(25_000)
            .pays(20_000, 15_000),
        Job::entry("tech-consultant", "Technical Consultant", Consultant, 3)
            .requires(560, 360)
            .pays(110_000, 18_000),
        Job::entry("cto", "Chief Technology Officer", Management, 4)
            .requires(650, 800)
            .pays(260_000, 30_000)
            .flagged_terminal(),
        Job::entry("principal-engineer", "Principal Engineer", Expert, 4)
            .requires(900, 600)
            .pays(240_000, 28_000)
            .flagged_terminal(),
        Job::entry("unicorn-founder", "Unicorn Founder", Founder, 4)
            .requires(600, 850)
            .requires_money(150_000)
            .pays(400_000, 35_000)
            .flagged_terminal(),
        Job::entry("principal-consultant", "Principal Consultant", Consultant, 4)
            .requires(820, 720)
            .pays(250_000, 28_000)
            .flagged_terminal(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> JobCatalog {
        JobCatalog::builtin().unwrap()
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let c = catalog();
        assert_eq!(c.jobs().len(), 17);
        assert_eq!(c.starting_job().unwrap().id.as_str(), "unemployed");
        assert_eq!(c.position("cs-student"), Some(2));
    }

    #[test]
    fn student_variants_resolve() {
        let c = catalog();
        let s = c.student_variant(Enrollment::SelfFunded).unwrap();
        let e = c.student_variant(Enrollment::FamilyFunded).unwrap();
        assert_eq!(s.id.as_str(), "cs-student");
        assert_eq!(e.id.as_str(), "cs-student-easy");
        assert!(s.yearly_pay < 0);
    }

    #[test]
    fn bridges_are_declared_on_data() {
        let c = catalog();
        let senior = c.get("senior-dev").unwrap();
        assert!(senior.bridges(CareerPath::Management));
        assert!(senior.bridges(CareerPath::Expert));
        let free = c.get("freelancer").unwrap();
        assert!(free.bridges(CareerPath::Founder));
        assert!(free.bridges(CareerPath::Consultant));
        let bridging: Vec<_> = c.jobs().iter().filter(|j| !j.bridges_to.is_empty()).collect();
        assert_eq!(bridging.len(), 2);
    }

    #[test]
    fn exempt_ids_exist() {
        let c = catalog();
        for id in INTERVIEW_EXEMPT {
            assert!(c.get(id).is_some(), "{id} missing");
        }
    }

    #[test]
    fn missing_starting_job_is_fatal() {
        let jobs: Vec<Job> = builtin_jobs().into_iter().filter(|j| !j.starting).collect();
        assert_eq!(JobCatalog::new(jobs).unwrap_err(), CatalogError::MissingStartingJob);
        assert_eq!(JobCatalog::new(vec![]).unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn missing_student_variant_is_fatal() {
        let jobs: Vec<Job> = builtin_jobs()
            .into_iter()
            .filter(|j| j.id.as_str() != "cs-student-easy")
            .collect();
        assert_eq!(
            JobCatalog::new(jobs).unwrap_err(),
            CatalogError::MissingStudentVariant(Enrollment::FamilyFunded)
        );
        let jobs: Vec<Job> = builtin_jobs()
            .into_iter()
            .filter(|j| j.enrollment != Some(Enrollment::SelfFunded))
            .collect();
        assert_eq!(
            JobCatalog::new(jobs).unwrap_err(),
            CatalogError::MissingStudentVariant(Enrollment::SelfFunded)
        );
    }

    #[test]
    fn only_one_starting_job() {
        let mut jobs = builtin_jobs();
        let mut second = jobs[0].clone();
        second.id = JobId::new("between-gigs");
        jobs.push(second);
        assert_eq!(
            JobCatalog::new(jobs).unwrap_err(),
            CatalogError::MultipleStartingJobs("between-gigs".into())
        );
    }

    #[test]
    fn starting_job_is_level_zero_hustler() {
        let mut jobs = builtin_jobs();
        jobs[0].level = 1;
        assert_eq!(
            JobCatalog::new(jobs).unwrap_err(),
            CatalogError::MisplacedStartingJob("unemployed".into())
        );
        let mut jobs = builtin_jobs();
        jobs[0].path = CareerPath::Corporate;
        assert_eq!(
            JobCatalog::new(jobs).unwrap_err(),
            CatalogError::MisplacedStartingJob("unemployed".into())
        );
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut jobs = builtin_jobs();
        jobs.push(jobs[5].clone());
        assert_eq!(
            JobCatalog::new(jobs).unwrap_err(),
            CatalogError::DuplicateId("junior-dev".into())
        );
    }

    #[test]
    fn unreachable_terminal_rejected() {
        let jobs: Vec<Job> = builtin_jobs()
            .into_iter()
            .filter(|j| j.id.as_str() != "eng-manager")
            .collect();
        assert_eq!(
            JobCatalog::new(jobs).unwrap_err(),
            CatalogError::UnreachableTerminal("cto".into())
        );
    }

    #[test]
    fn level_zero_only_for_start() {
        let mut jobs = builtin_jobs();
        jobs[1].level = 0;
        assert!(matches!(
            JobCatalog::new(jobs).unwrap_err(),
            CatalogError::LevelOutOfRange { .. }
        ));
    }

    #[test]
    fn serde_roundtrip_job() {
        let c = catalog();
        let j = c.get("startup-founder").unwrap();
        let s = serde_json::to_string(j).unwrap();
        let back: Job = serde_json::from_str(&s).unwrap();
        assert_eq!(&back, j);
        assert_eq!(back.requirements.money, Some(25_000));
    }
}
