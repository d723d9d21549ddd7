//! Clinical case payloads, evaluation results, and case history records.
//!
//! Cases are produced by the AI collaborator, so every field the generator
//! may omit is defaulted on deserialization.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One scripted question/answer exchange with the pet owner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct DialoguePair {
    /// Question the player can ask.
    pub question: String,
    /// Owner's reply.
    pub answer: String,
    /// Topic tag, e.g. diet or vaccination.
    pub topic: String,
}

/// Findings of the physical examination.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PhysicalExam {
    /// Inspection.
    pub visual: String,
    /// Auscultation.
    pub auscultation: String,
    /// Palpation.
    pub palpation: String,
    /// Olfaction.
    pub olfaction: String,
    /// Wood's lamp fluorescence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub woods_lamp: Option<String>,
}

/// Temperature, pulse, respiration and related vitals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct Vitals {
    /// Rectal temperature in °C.
    pub temp: f64,
    /// Heart rate per minute.
    pub hr: f64,
    /// Respiratory rate per minute.
    pub rr: f64,
    /// Mucous membrane colour.
    pub mm: String,
    /// Capillary refill time.
    pub crt: String,
    /// Blood pressure, e.g. `120/80`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bp: Option<String>,
}

/// A lab value, either numeric or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum LabValue {
    /// Numeric reading.
    Number(f64),
    /// Textual reading.
    Text(String),
}

/// One line of a lab panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LabResultItem {
    /// Analyte name.
    pub name: String,
    /// Measured value.
    pub value: LabValue,
    /// Unit.
    #[serde(default)]
    pub unit: String,
    /// Reference range.
    #[serde(default)]
    pub ref_range: String,
    /// `H`, `L` or `N`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

/// Imaging findings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Imaging {
    /// Radiograph description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xray_description: Option<String>,
    /// Ultrasound description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usg_description: Option<String>,
}

impl Imaging {
    /// Whether no imaging finding is present.
    pub const fn is_empty(&self) -> bool {
        self.xray_description.is_none() && self.usg_description.is_none()
    }
}

/// A generated clinical case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ClinicalCase {
    /// Case identifier.
    pub id: String,
    /// Species, e.g. 犬 or 猫.
    pub species: String,
    /// Breed.
    pub breed: String,
    /// Age as free text.
    pub age: String,
    /// Sex.
    pub sex: String,
    /// Body weight in kilograms.
    pub weight_kg: f64,
    /// Owner personality.
    pub owner_persona: String,
    /// Reason for the visit.
    pub chief_complaint: String,
    /// History revealed only when asked.
    pub history_secret: String,
    /// Available owner interview.
    pub dialogue: Vec<DialoguePair>,
    /// Physical examination findings.
    pub physical_exam: PhysicalExam,
    /// Vitals. Revealed by the `tpr` unlock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tpr: Option<Vitals>,
    /// One-line CBC summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cbc_summary: Option<String>,
    /// One-line chemistry summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chem_summary: Option<String>,
    /// One-line radiograph summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xray_summary: Option<String>,
    /// Full CBC panel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cbc: Option<Vec<LabResultItem>>,
    /// Full chemistry panel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chem: Option<Vec<LabResultItem>>,
    /// Blood gas panel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_gas: Option<Vec<LabResultItem>>,
    /// Imaging findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imaging: Option<Imaging>,
    /// Difficulty from 1 to 5.
    pub difficulty: u32,
    /// Diagnosis choices offered to lower ranks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis_options: Option<Vec<String>>,
    /// Treatment choices offered to lower ranks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_options: Option<Vec<String>>,
    /// Reference diagnosis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_diagnosis: Option<String>,
    /// Reference treatment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_treatment: Option<String>,
}

/// The evaluator's verdict on a submitted diagnosis and plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EvaluationResult {
    /// Whether the diagnosis is acceptable.
    pub is_correct: bool,
    /// Score from 0 to 100.
    pub score: u32,
    /// Teaching feedback.
    #[serde(default)]
    pub feedback: String,
    /// Reference diagnosis.
    #[serde(default)]
    pub correct_diagnosis: String,
    /// Reference plan.
    #[serde(default)]
    pub standard_of_care: String,
}

/// An immutable record of one completed case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CaseHistoryItem {
    /// Record identifier.
    pub id: String,
    /// Completion time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// The case as it was presented.
    pub case_data: ClinicalCase,
    /// The evaluation received.
    pub result: EvaluationResult,
    /// Submitted diagnosis.
    pub user_diagnosis: String,
    /// Submitted plan.
    pub user_plan: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn sparse_case_deserializes() {
        let case: ClinicalCase = serde_json::from_str(
            r#"{"species":"猫","weightKg":4.2,"tpr":{"temp":39.1,"hr":180,"rr":30,"mm":"粉红","crt":"<2s"}}"#,
        )
        .unwrap();
        assert_eq!(case.species, "猫");
        assert!(case.tpr.is_some());
        assert!(case.cbc.is_none());
        assert!(case.dialogue.is_empty());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn lab_value_accepts_text_or_number() {
        let items: Vec<LabResultItem> = serde_json::from_str(
            r#"[{"name":"WBC","value":25.0,"unit":"10^9/L","refRange":"6-17","flag":"H"},
                {"name":"PLT","value":"正常"}]"#,
        )
        .unwrap();
        assert!(matches!(items.first().map(|i| &i.value), Some(LabValue::Number(_))));
        assert!(matches!(items.get(1).map(|i| &i.value), Some(LabValue::Text(_))));
    }
}
