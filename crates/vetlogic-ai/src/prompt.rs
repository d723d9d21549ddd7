//! Prompt template loading and rendering via `minijinja`.
//!
//! The templates ship inside the binary. An operator may point
//! [`PromptEngine::from_dir`] at a directory holding replacements for any
//! of them; missing files fall back to the built-in text.

use std::path::Path;

use minijinja::{Environment, context};
use serde::Serialize;
use vetlogic_types::{ClinicalCase, Rank};

use crate::error::AiError;

const BUILTIN: &[(&str, &str)] = &[
    ("case_system", include_str!("../templates/case_system.j2")),
    ("case_user", include_str!("../templates/case_user.j2")),
    ("evaluate_system", include_str!("../templates/evaluate_system.j2")),
    ("evaluate_user", include_str!("../templates/evaluate_user.j2")),
    (
        "qualification_system",
        include_str!("../templates/qualification_system.j2"),
    ),
    (
        "qualification_user",
        include_str!("../templates/qualification_user.j2"),
    ),
];

/// A system and user message pair ready for the chat API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// System message.
    pub system: String,
    /// User message.
    pub user: String,
}

/// Renders every prompt the game sends.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl std::fmt::Debug for PromptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptEngine").finish_non_exhaustive()
    }
}

impl PromptEngine {
    /// An engine over the built-in templates.
    pub fn builtin() -> Result<Self, AiError> {
        let mut env = Environment::new();
        for &(name, source) in BUILTIN {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// An engine preferring `<dir>/<name>.j2` over the built-in templates.
    pub fn from_dir(dir: &Path) -> Result<Self, AiError> {
        let mut env = Environment::new();
        for &(name, source) in BUILTIN {
            let path = dir.join(format!("{name}.j2"));
            match std::fs::read_to_string(&path) {
                Ok(custom) => {
                    tracing::info!(template = name, path = %path.display(), "using template override");
                    env.add_template_owned(name.to_owned(), custom)?;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    env.add_template(name, source)?;
                }
                Err(e) => {
                    return Err(AiError::Template(format!(
                        "failed to read {}: {e}",
                        path.display()
                    )));
                }
            }
        }
        Ok(Self { env })
    }

    fn pair(&self, prefix: &str, ctx: &minijinja::Value) -> Result<RenderedPrompt, AiError> {
        let system = self
            .env
            .get_template(&format!("{prefix}_system"))?
            .render(ctx)?;
        let user = self
            .env
            .get_template(&format!("{prefix}_user"))?
            .render(ctx)?;
        Ok(RenderedPrompt {
            system: system.trim().to_owned(),
            user: user.trim().to_owned(),
        })
    }

    /// Case generation prompt, optionally seeded from a disease template.
    pub fn case<T: Serialize>(
        &self,
        rank: Rank,
        template: Option<&T>,
    ) -> Result<RenderedPrompt, AiError> {
        let ctx = context! {
            rank => rank.label(),
            difficulty => rank.difficulty(),
            template => template,
        };
        self.pair("case", &ctx)
    }

    /// Grading prompt for a submitted diagnosis and plan.
    pub fn evaluate(
        &self,
        case: &ClinicalCase,
        diagnosis: &str,
        plan: &str,
    ) -> Result<RenderedPrompt, AiError> {
        let ctx = context! {
            case => case,
            diagnosis => diagnosis,
            plan => plan,
        };
        self.pair("evaluate", &ctx)
    }

    /// Qualification exam prompt for promotion to `target`.
    pub fn qualification(&self, target: Rank, count: usize) -> Result<RenderedPrompt, AiError> {
        let ctx = context! {
            rank => target.label(),
            count => count,
        };
        self.pair("qualification", &ctx)
    }
}
