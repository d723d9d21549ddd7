//! Network collaborators for the `VetLogic` game.
//!
//! Implements the collaborator traits from `vetlogic-core` against real
//! services: `DeepSeek` chat completions for case generation, grading and
//! qualification exams, and Supabase for the question bank and disease
//! templates.
//!
//! # Modules
//!
//! - [`deepseek`] -- [`DeepSeekGenerator`], the LLM-backed case generator
//! - [`error`] -- [`AiError`] and its mapping onto collaborator errors
//! - [`llm`] -- Chat completions HTTP client with deadline and status mapping
//! - [`parse`] -- JSON recovery and normalization of model and bank output
//! - [`prompt`] -- `minijinja` prompt templates
//! - [`source`] -- [`QuestionSource`], remote or built-in bank
//! - [`supabase`] -- `PostgREST` client, case templates, remote bank

pub mod deepseek;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod source;
pub mod supabase;

pub use deepseek::DeepSeekGenerator;
pub use error::AiError;
pub use llm::ChatClient;
pub use prompt::{PromptEngine, RenderedPrompt};
pub use source::QuestionSource;
pub use supabase::{CaseTemplate, SupabaseBank, SupabaseClient};
