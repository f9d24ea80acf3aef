//! Offline interview generation: template pick, filler substitution and
//! option shuffling, all driven by a caller-supplied RNG.

use crate::bank::{QuestionTemplate, TemplateBank};
use career_core::{CareerPath, Job};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Questions per interview session.
pub const QUESTIONS_PER_SESSION: usize = 3;

/// A generated multiple-choice question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
}

/// Hardest template difficulty allowed for a job level.
pub fn difficulty_ceiling(level: u8) -> u8 {
    match level {
        0..=2 => 1,
        3 => 2,
        _ => 3,
    }
}

impl TemplateBank {
    /// Templates eligible for `(path, level)`, widening until non-empty:
    /// path within ceiling, then path at any difficulty, then every
    /// difficulty-1 template.
    pub fn candidates(&self, path: CareerPath, level: u8) -> Vec<&QuestionTemplate> {
        let ceiling = difficulty_ceiling(level);
        let on_path = |t: &&QuestionTemplate| t.paths.contains(&path);
        let scoped: Vec<_> = self
            .templates()
            .iter()
            .filter(on_path)
            .filter(|t| t.difficulty <= ceiling)
            .collect();
        if !scoped.is_empty() {
            return scoped;
        }
        let any_difficulty: Vec<_> = self.templates().iter().filter(on_path).collect();
        if !any_difficulty.is_empty() {
            warn!(%path, level, "no template within difficulty ceiling, ignoring difficulty");
            return any_difficulty;
        }
        warn!(%path, level, "no template for path, using difficulty-1 pool");
        self.templates()
            .iter()
            .filter(|t| t.difficulty == 1)
            .collect()
    }

    /// Replace every `{{placeholder}}`, drawing independently per occurrence.
    pub fn fill<R: Rng + ?Sized>(&self, text: &str, path: CareerPath, rng: &mut R) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                out.push_str(&rest[open..]);
                return out;
            };
            let name = after[..close].trim();
            match self.vocabulary(name, path).and_then(|words| words.choose(rng)) {
                Some(word) => out.push_str(word),
                None => out.push_str(&rest[open..open + 2 + close + 2]),
            }
            rest = &after[close + 2..];
        }
        out.push_str(rest);
        out
    }

    /// Build one question for the target job.
    pub fn generate_question<R: Rng + ?Sized>(&self, job: &Job, rng: &mut R) -> InterviewQuestion {
        let pool = self.candidates(job.path, job.level);
        // Non-empty: construction guarantees a difficulty-1 template.
        let template = pool[rng.gen_range(0..pool.len())];
        debug!(job = %job.id, template = %template.id, "picked interview template");

        let question = self.fill(&template.text, job.path, rng);
        let mut options = self.answer_pool(template.difficulty).to_vec();
        options.shuffle(rng);
        let correct_index = options.iter().position(|o| o.correct).unwrap_or(0);
        let explanation = options
            .get(correct_index)
            .and_then(|o| o.explanation.clone())
            .unwrap_or_default();
        InterviewQuestion {
            question,
            options: options.into_iter().map(|o| o.text).collect(),
            correct_index,
            explanation,
        }
    }

    /// Three independently generated questions; repeats are allowed.
    pub fn generate_offline_interview_set<R: Rng + ?Sized>(
        &self,
        job: &Job,
        rng: &mut R,
    ) -> Vec<InterviewQuestion> {
        (0..QUESTIONS_PER_SESSION)
            .map(|_| self.generate_question(job, rng))
            .collect()
    }
}
