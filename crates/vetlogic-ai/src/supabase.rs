//! Supabase (`PostgREST`) access for the question bank and case templates.
//!
//! Three tables are used:
//!
//! - `vet_exam_questions` -- real licensing exam questions
//! - `user_exam_records` -- one row per answered question
//! - `case_templates` -- disease templates that seed case generation

use std::collections::BTreeMap;
use std::time::Duration;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vetlogic_core::collab::{CollabError, QuestionBank};
use vetlogic_types::{AnswerRecord, ExamQuestion};

use crate::error::AiError;
use crate::parse::question_from_row;

const QUESTIONS_TABLE: &str = "vet_exam_questions";
const RECORDS_TABLE: &str = "user_exam_records";
const TEMPLATES_TABLE: &str = "case_templates";

/// A disease template used to seed case generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseTemplate {
    /// Row id.
    #[serde(default)]
    pub id: Value,
    /// Species, e.g. 犬.
    pub species: String,
    /// Disease name; templates are de-duplicated on it.
    pub disease_name: String,
    /// Difficulty, 1 to 5.
    pub difficulty: u32,
    /// Typical presentation (complaint, exam, vitals, lab findings).
    #[serde(default)]
    pub typical_symptoms: Value,
    /// Typical lab patterns.
    #[serde(default)]
    pub lab_patterns: Value,
    /// Treatment guidelines.
    #[serde(default)]
    pub treatment_guidelines: String,
    /// Reference diagnosis.
    #[serde(default)]
    pub correct_diagnosis: String,
}

/// A thin `PostgREST` client.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.rest_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Create a client for the project at `url`.
    pub fn new(url: &str, anon_key: &str, timeout: Duration) -> Result<Self, AiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            anon_key: anon_key.to_owned(),
        })
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{table}", self.rest_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("unable to read error body: {e}"));
        Err(AiError::from_status(status.as_u16(), body))
    }

    async fn select(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<Value>, AiError> {
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_owned())];
        query.extend(filters.iter().cloned());
        let response = self
            .request(reqwest::Method::GET, table)
            .query(&query)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Every real exam question, optionally limited to `subject`.
    pub async fn exam_questions(
        &self,
        subject: Option<&str>,
    ) -> Result<Vec<ExamQuestion>, AiError> {
        let mut filters = vec![("is_real_exam", "eq.true".to_owned())];
        if let Some(subject) = subject {
            filters.push(("subject", format!("eq.{subject}")));
        }
        let rows = self.select(QUESTIONS_TABLE, &filters).await?;
        let total = rows.len();
        let questions: Vec<ExamQuestion> = rows
            .iter()
            .filter_map(|row| match question_from_row(row) {
                Ok(q) => Some(q),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unusable question row");
                    None
                }
            })
            .collect();
        tracing::debug!(
            total,
            usable = questions.len(),
            subject = subject.unwrap_or("all"),
            "questions fetched"
        );
        Ok(questions)
    }

    /// A single question by id.
    pub async fn question(&self, id: &str) -> Result<Option<ExamQuestion>, AiError> {
        let rows = self
            .select(QUESTIONS_TABLE, &[("id", format!("eq.{id}"))])
            .await?;
        rows.first().map(question_from_row).transpose()
    }

    /// Insert one answer record.
    pub async fn insert_record(&self, record: &AnswerRecord) -> Result<(), AiError> {
        let response = self
            .request(reqwest::Method::POST, RECORDS_TABLE)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::debug!(user = %record.user_id, question = %record.question_id, "answer recorded");
        Ok(())
    }

    /// Templates at `difficulty` or one below, de-duplicated by disease.
    pub async fn case_templates(&self, difficulty: u32) -> Result<Vec<CaseTemplate>, AiError> {
        let floor = difficulty.saturating_sub(1).max(1);
        let rows = self
            .select(
                TEMPLATES_TABLE,
                &[
                    ("difficulty", format!("lte.{difficulty}")),
                    ("difficulty", format!("gte.{floor}")),
                ],
            )
            .await?;
        let total = rows.len();
        let mut by_disease: BTreeMap<String, CaseTemplate> = BTreeMap::new();
        for row in rows {
            match serde_json::from_value::<CaseTemplate>(row) {
                Ok(template) => {
                    by_disease.insert(template.disease_name.clone(), template);
                }
                Err(e) => tracing::warn!(error = %e, "skipping unusable case template"),
            }
        }
        tracing::debug!(total, distinct = by_disease.len(), difficulty, "case templates fetched");
        Ok(by_disease.into_values().collect())
    }
}

/// Pick one template at random.
pub fn pick_template(templates: &[CaseTemplate], rng: &mut impl Rng) -> Option<CaseTemplate> {
    templates.choose(rng).cloned()
}

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

/// The remote [`QuestionBank`].
#[derive(Debug, Clone)]
pub struct SupabaseBank {
    client: SupabaseClient,
}

impl SupabaseBank {
    /// A bank over `client`.
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

/// Shuffle `questions` and keep at most `count`.
pub fn shuffle_truncate(
    mut questions: Vec<ExamQuestion>,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<ExamQuestion> {
    questions.shuffle(rng);
    questions.truncate(count);
    questions
}

impl QuestionBank for SupabaseBank {
    async fn random_questions(
        &self,
        count: usize,
        subject: Option<&str>,
    ) -> Result<Vec<ExamQuestion>, CollabError> {
        let questions = self.client.exam_questions(subject).await?;
        Ok(shuffle_truncate(questions, count, &mut rand::rng()))
    }

    async fn question_by_id(&self, id: &str) -> Result<Option<ExamQuestion>, CollabError> {
        Ok(self.client.question(id).await?)
    }

    async fn record_answer(&self, record: &AnswerRecord) -> Result<(), CollabError> {
        Ok(self.client.insert_record(record).await?)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use serde_json::json;
    use vetlogic_types::{AnswerKey, QuestionType};

    use super::*;

    fn question(id: &str) -> ExamQuestion {
        ExamQuestion {
            id: id.to_owned(),
            question_type: QuestionType::Single,
            stem: String::new(),
            options: vec!["A".to_owned(), "B".to_owned()],
            correct_answer: AnswerKey::Single(0),
            explanation: String::new(),
            subject: String::new(),
            exam_year: None,
        }
    }

    #[test]
    fn shuffle_keeps_requested_count() {
        let mut rng = SmallRng::seed_from_u64(3);
        let all: Vec<ExamQuestion> = (0..10).map(|i| question(&i.to_string())).collect();
        assert_eq!(shuffle_truncate(all.clone(), 4, &mut rng).len(), 4);
        assert_eq!(shuffle_truncate(all, 50, &mut rng).len(), 10);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn template_row_deserializes() {
        let row = json!({
            "id": "7b7c",
            "species": "犬",
            "disease_name": "犬瘟热",
            "difficulty": 3,
            "typical_symptoms": {"chiefComplaint": "咳嗽流涕"},
            "treatment_guidelines": "对症支持",
            "correct_diagnosis": "犬瘟热"
        });
        let template: CaseTemplate = serde_json::from_value(row).unwrap();
        assert_eq!(template.difficulty, 3);
        assert!(template.lab_patterns.is_null());

        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(pick_template(&[template.clone()], &mut rng), Some(template));
        assert_eq!(pick_template(&[], &mut rng), None);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn rest_url_normalized() {
        let client =
            SupabaseClient::new("https://x.supabase.co/", "k", Duration::from_secs(1)).unwrap();
        assert_eq!(client.rest_url, "https://x.supabase.co/rest/v1");
    }
}
