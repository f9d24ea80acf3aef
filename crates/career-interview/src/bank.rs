//! Question templates, filler vocabularies and answer pools.

use career_core::{CareerPath, ALL_PATHS};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Placeholder whose vocabulary is keyed by career path.
pub const TECH_STACK: &str = "tech_stack";
/// Options per question.
pub const OPTIONS_PER_QUESTION: usize = 4;

const BUILTIN_BANK: &str = include_str!("../../../assets/data/interview_bank.yaml");

/// A question skeleton with `{{placeholder}}` slots.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionTemplate {
    pub id: String,
    pub text: String,
    pub paths: Vec<CareerPath>,
    /// 1 easy, 2 medium, 3 hard.
    pub difficulty: u8,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnswerPools {
    pub easy: Vec<AnswerOption>,
    pub medium: Vec<AnswerOption>,
    pub hard: Vec<AnswerOption>,
}

/// Raw bank as stored on disk.
#[derive(Clone, Debug, Deserialize)]
pub struct BankFile {
    pub templates: Vec<QuestionTemplate>,
    #[serde(default)]
    pub fillers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub tech_stack: BTreeMap<CareerPath, Vec<String>>,
    pub answers: AnswerPools,
}

#[derive(Debug, Error, PartialEq)]
pub enum BankError {
    #[error("invalid bank yaml: {0}")]
    Yaml(String),
    #[error("template bank has no difficulty-1 template to fall back on")]
    NoFallbackTemplate,
    #[error("template {0} has difficulty outside 1..=3")]
    DifficultyOutOfRange(String),
    #[error("template {0} lists no paths")]
    NoPaths(String),
    #[error("template {template} uses unknown placeholder {placeholder}")]
    UnknownPlaceholder {
        template: String,
        placeholder: String,
    },
    #[error("filler vocabulary {0} is empty")]
    EmptyVocabulary(String),
    #[error("no tech stack vocabulary for path {0}")]
    MissingTechStack(CareerPath),
    #[error("answer pool {tier} must have {expected} options with exactly one correct and explained")]
    MalformedAnswerPool { tier: &'static str, expected: usize },
}

impl From<serde_yaml::Error> for BankError {
    fn from(e: serde_yaml::Error) -> Self {
        BankError::Yaml(e.to_string())
    }
}

/// Validated template bank. Construction fails on any integrity problem.
#[derive(Clone, Debug)]
pub struct TemplateBank {
    templates: Vec<QuestionTemplate>,
    fillers: BTreeMap<String, Vec<String>>,
    tech_stack: BTreeMap<CareerPath, Vec<String>>,
    answers: AnswerPools,
}

impl TemplateBank {
    pub fn new(file: BankFile) -> Result<Self, BankError> {
        validate(&file)?;
        Ok(Self {
            templates: file.templates,
            fillers: file.fillers,
            tech_stack: file.tech_stack,
            answers: file.answers,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, BankError> {
        let file: BankFile = serde_yaml::from_str(text)?;
        Self::new(file)
    }

    /// The bank shipped with the game.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_yaml_str(BUILTIN_BANK)
    }

    pub fn templates(&self) -> &[QuestionTemplate] {
        &self.templates
    }

    pub(crate) fn vocabulary(&self, placeholder: &str, path: CareerPath) -> Option<&[String]> {
        if placeholder == TECH_STACK {
            self.tech_stack.get(&path).map(Vec::as_slice)
        } else {
            self.fillers.get(placeholder).map(Vec::as_slice)
        }
    }

    pub(crate) fn answer_pool(&self, difficulty: u8) -> &[AnswerOption] {
        match difficulty {
            0 | 1 => &self.answers.easy,
            2 => &self.answers.medium,
            _ => &self.answers.hard,
        }
    }
}

/// Names of every `{{placeholder}}` in `text`, in order of appearance.
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                out.push(after[..close].trim());
                rest = &after[close + 2..];
            }
            None => break,
        }
    }
    out
}

fn validate(file: &BankFile) -> Result<(), BankError> {
    if !file.templates.iter().any(|t| t.difficulty == 1) {
        return Err(BankError::NoFallbackTemplate);
    }
    for t in &file.templates {
        if !(1..=3).contains(&t.difficulty) {
            return Err(BankError::DifficultyOutOfRange(t.id.clone()));
        }
        if t.paths.is_empty() {
            return Err(BankError::NoPaths(t.id.clone()));
        }
        for name in placeholders(&t.text) {
            if name != TECH_STACK && !file.fillers.contains_key(name) {
                return Err(BankError::UnknownPlaceholder {
                    template: t.id.clone(),
                    placeholder: name.to_string(),
                });
            }
        }
    }
    for (name, words) in &file.fillers {
        if words.is_empty() {
            return Err(BankError::EmptyVocabulary(name.clone()));
        }
    }
    // The difficulty-1 fallback may serve any path, so every path needs a stack.
    for path in ALL_PATHS {
        if file.tech_stack.get(&path).map_or(true, Vec::is_empty) {
            return Err(BankError::MissingTechStack(path));
        }
    }
    for (tier, pool) in [
        ("easy", &file.answers.easy),
        ("medium", &file.answers.medium),
        ("hard", &file.answers.hard),
    ] {
        let correct: Vec<&AnswerOption> = pool.iter().filter(|o| o.correct).collect();
        let explained = correct.len() == 1 && correct[0].explanation.is_some();
        if pool.len() != OPTIONS_PER_QUESTION || !explained {
            return Err(BankError::MalformedAnswerPool {
                tier,
                expected: OPTIONS_PER_QUESTION,
            });
        }
    }
    Ok(())
}
