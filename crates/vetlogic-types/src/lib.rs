//! Shared type definitions for the `VetLogic` veterinary career game.
//!
//! This crate is the single source of truth for the data exchanged between
//! the rules engine, the save store, the AI collaborators and the HTTP
//! proxy. Types flow downstream to `TypeScript` via `ts-rs` for the
//! browser client.
//!
//! # Modules
//!
//! - [`enums`] -- Ranks, talent branches and effect kinds, question types
//! - [`equipment`] -- Clinic equipment and the default catalog
//! - [`talent`] -- Talent nodes and the default tree
//! - [`clinical`] -- Clinical cases, evaluations, history records
//! - [`exam`] -- Exam questions and answer shapes
//! - [`state`] -- The persisted game state and its partial update

pub mod clinical;
pub mod enums;
pub mod equipment;
pub mod exam;
pub mod state;
pub mod talent;

// Re-export all public types at crate root for convenience.
pub use clinical::{
    CaseHistoryItem, ClinicalCase, DialoguePair, EvaluationResult, Imaging, LabResultItem,
    LabValue, PhysicalExam, Vitals,
};
pub use enums::{EffectKind, QuestionType, Rank, TalentBranch};
pub use equipment::{BASIC_KIT_ID, Equipment, default_catalog};
pub use exam::{AnswerKey, AnswerRecord, ExamQuestion};
pub use state::{GameState, GameStatePatch, MilestoneProgress};
pub use talent::{TalentEffect, TalentNode, default_talents};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::enums::Rank::export_all();
        let _ = crate::enums::TalentBranch::export_all();
        let _ = crate::enums::EffectKind::export_all();
        let _ = crate::enums::QuestionType::export_all();

        let _ = crate::equipment::Equipment::export_all();
        let _ = crate::talent::TalentNode::export_all();
        let _ = crate::clinical::ClinicalCase::export_all();
        let _ = crate::clinical::EvaluationResult::export_all();
        let _ = crate::clinical::CaseHistoryItem::export_all();
        let _ = crate::exam::ExamQuestion::export_all();
        let _ = crate::exam::AnswerRecord::export_all();
        let _ = crate::state::GameState::export_all();
        let _ = crate::state::GameStatePatch::export_all();
    }
}
