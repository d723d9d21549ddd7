//! The `DeepSeek` case generator.
//!
//! Implements [`CaseGenerator`] on top of the chat client:
//!
//! 1. **Case generation** -- when a template source is configured, a
//!    random disease template at the rank's difficulty (or one below)
//!    seeds the prompt. Without one, or when the lookup fails, the model
//!    invents the case on its own.
//! 2. **Evaluation** -- the case, diagnosis and plan go to an examiner
//!    prompt; the verdict is normalized.
//! 3. **Qualification** -- a batch of hard single-choice questions for the
//!    target rank.

use chrono::Utc;
use vetlogic_core::collab::{CaseGenerator, CollabError};
use vetlogic_core::config::LlmConfig;
use vetlogic_types::{ClinicalCase, EvaluationResult, ExamQuestion, Rank};

use crate::error::AiError;
use crate::llm::ChatClient;
use crate::parse::{case_from_json, evaluation_from_json, parse_json, quiz_from_json};
use crate::prompt::PromptEngine;
use crate::supabase::{CaseTemplate, SupabaseClient, pick_template};

/// Subject tag attached to generated qualification questions.
const QUALIFICATION_SUBJECT: &str = "资格考试";

/// LLM-backed [`CaseGenerator`].
#[derive(Debug)]
pub struct DeepSeekGenerator {
    chat: ChatClient,
    prompts: PromptEngine,
    templates: Option<SupabaseClient>,
}

impl DeepSeekGenerator {
    /// Create a generator with the built-in prompts.
    pub fn new(config: &LlmConfig) -> Result<Self, AiError> {
        Ok(Self::with_prompts(ChatClient::new(config), PromptEngine::builtin()?))
    }

    /// Create a generator from its parts.
    pub const fn with_prompts(chat: ChatClient, prompts: PromptEngine) -> Self {
        Self {
            chat,
            prompts,
            templates: None,
        }
    }

    /// Seed case generation from the `case_templates` table.
    #[must_use]
    pub fn with_templates(mut self, client: SupabaseClient) -> Self {
        self.templates = Some(client);
        self
    }

    async fn template_for(&self, rank: Rank) -> Option<CaseTemplate> {
        let client = self.templates.as_ref()?;
        let templates = match client.case_templates(rank.difficulty()).await {
            Ok(templates) => templates,
            Err(e) => {
                tracing::warn!(
                    rank = %rank,
                    error = %e,
                    "case template lookup failed, generating freely"
                );
                return None;
            }
        };
        let picked = pick_template(&templates, &mut rand::rng());
        match &picked {
            Some(t) => tracing::info!(
                disease = %t.disease_name,
                candidates = templates.len(),
                "case template selected"
            ),
            None => tracing::warn!(rank = %rank, "no case template for difficulty"),
        }
        picked
    }

    async fn generate(&self, rank: Rank) -> Result<ClinicalCase, AiError> {
        let template = self.template_for(rank).await;
        let prompt = self.prompts.case(rank, template.as_ref())?;
        let raw = self.chat.complete(&prompt).await?;
        let difficulty = template
            .as_ref()
            .map_or_else(|| rank.difficulty(), |t| t.difficulty);
        let id = Utc::now().timestamp_millis().to_string();
        let case = case_from_json(parse_json(&raw)?, id, difficulty)?;
        tracing::info!(rank = %rank, id = %case.id, species = %case.species, "case generated");
        Ok(case)
    }

    async fn grade(
        &self,
        case: &ClinicalCase,
        diagnosis: &str,
        plan: &str,
    ) -> Result<EvaluationResult, AiError> {
        let prompt = self.prompts.evaluate(case, diagnosis, plan)?;
        let raw = self.chat.complete(&prompt).await?;
        let evaluation = evaluation_from_json(&parse_json(&raw)?)?;
        tracing::info!(
            case = %case.id,
            correct = evaluation.is_correct,
            score = evaluation.score,
            "case evaluated"
        );
        Ok(evaluation)
    }

    async fn qualification(
        &self,
        target: Rank,
        count: usize,
    ) -> Result<Vec<ExamQuestion>, AiError> {
        let prompt = self.prompts.qualification(target, count)?;
        let raw = self.chat.complete(&prompt).await?;
        let prefix = format!("qual-{}-{}", target.code(), Utc::now().timestamp_millis());
        let mut questions = quiz_from_json(&parse_json(&raw)?, &prefix, QUALIFICATION_SUBJECT);
        if questions.len() > count {
            questions.truncate(count);
        }
        if questions.is_empty() {
            return Err(AiError::Parse("no usable qualification questions".to_owned()));
        }
        tracing::info!(
            to = %target,
            questions = questions.len(),
            "qualification exam generated"
        );
        Ok(questions)
    }
}

impl CaseGenerator for DeepSeekGenerator {
    async fn generate_case(&self, rank: Rank) -> Result<ClinicalCase, CollabError> {
        Ok(self.generate(rank).await?)
    }

    async fn evaluate(
        &self,
        case: &ClinicalCase,
        diagnosis: &str,
        plan: &str,
    ) -> Result<EvaluationResult, CollabError> {
        Ok(self.grade(case, diagnosis, plan).await?)
    }

    async fn qualification_exam(
        &self,
        target: Rank,
        count: usize,
    ) -> Result<Vec<ExamQuestion>, CollabError> {
        Ok(self.qualification(target, count).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn unconfigured_key_surfaces() {
        let generator = DeepSeekGenerator::new(&LlmConfig::default()).unwrap();
        let err = generator.generate_case(Rank::Student).await;
        assert!(matches!(err, Err(CollabError::NotConfigured(_))));
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn no_template_source_means_free_generation() {
        let generator = DeepSeekGenerator::new(&LlmConfig::default()).unwrap();
        assert!(generator.template_for(Rank::Chief).await.is_none());
    }
}
