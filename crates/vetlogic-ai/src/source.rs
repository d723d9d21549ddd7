//! Runtime selection of the question bank.
//!
//! Uses enum dispatch because the collaborator traits return opaque
//! futures and cannot be used as trait objects.

use std::time::Duration;

use vetlogic_core::StaticQuestionBank;
use vetlogic_core::collab::{CollabError, QuestionBank};
use vetlogic_core::config::QuestionBankConfig;
use vetlogic_types::{AnswerRecord, ExamQuestion};

use crate::error::AiError;
use crate::supabase::{SupabaseBank, SupabaseClient};

/// Either the remote bank or the built-in one.
#[derive(Debug, Clone)]
pub enum QuestionSource {
    /// Supabase-backed bank.
    Remote(SupabaseBank),
    /// The built-in static bank.
    Static(StaticQuestionBank),
}

impl QuestionSource {
    /// The remote bank when credentials are configured, otherwise the
    /// built-in one.
    pub fn from_config(config: &QuestionBankConfig, timeout: Duration) -> Result<Self, AiError> {
        if let Some((url, key)) = config.credentials() {
            tracing::info!(url, "using remote question bank");
            let client = SupabaseClient::new(url, key, timeout)?;
            return Ok(Self::Remote(SupabaseBank::new(client)));
        }
        tracing::warn!("question bank not configured, using built-in questions");
        Ok(Self::Static(StaticQuestionBank::builtin()?))
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Remote(_) => "supabase",
            Self::Static(_) => "static",
        }
    }
}

impl QuestionBank for QuestionSource {
    async fn random_questions(
        &self,
        count: usize,
        subject: Option<&str>,
    ) -> Result<Vec<ExamQuestion>, CollabError> {
        match self {
            Self::Remote(bank) => bank.random_questions(count, subject).await,
            Self::Static(bank) => bank.random_questions(count, subject).await,
        }
    }

    async fn question_by_id(&self, id: &str) -> Result<Option<ExamQuestion>, CollabError> {
        match self {
            Self::Remote(bank) => bank.question_by_id(id).await,
            Self::Static(bank) => bank.question_by_id(id).await,
        }
    }

    async fn record_answer(&self, record: &AnswerRecord) -> Result<(), CollabError> {
        match self {
            Self::Remote(bank) => bank.record_answer(record).await,
            Self::Static(bank) => bank.record_answer(record).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn falls_back_without_credentials() {
        let source =
            QuestionSource::from_config(&QuestionBankConfig::default(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(source.name(), "static");

        let config = QuestionBankConfig {
            url: Some("https://x.supabase.co".to_owned()),
            anon_key: Some("anon".to_owned()),
        };
        let source = QuestionSource::from_config(&config, Duration::from_secs(1)).unwrap();
        assert_eq!(source.name(), "supabase");
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn static_source_serves_questions() {
        let source = QuestionSource::Static(StaticQuestionBank::builtin().unwrap());
        let questions = source.random_questions(3, None).await.unwrap();
        assert_eq!(questions.len(), 3);
    }
}
