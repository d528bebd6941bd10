use serde::{Deserialize, Serialize};

use crate::grading::{GradingConfig, ResultSummary};
use crate::identity::DateNormalizer;
use crate::records::StudentRecord;

/// Everything the result document and share surfaces render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCard {
    pub name: String,
    pub roll_no: String,
    pub class_name: String,
    pub email: String,
    /// `DD/MM/YYYY` when the stored DOB parses, otherwise the stored text.
    pub dob: String,
    pub summary: ResultSummary,
    /// Always two decimals, as printed on the result document.
    pub percentage_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    pub share_payload: String,
}

impl ResultCard {
    pub fn new(student: &StudentRecord, summary: ResultSummary, normalizer: &DateNormalizer) -> Self {
        let dob = normalizer
            .normalize(&student.dob)
            .map(|date| date.display())
            .unwrap_or_else(|_| student.dob.trim().to_string());

        Self {
            name: student.name.clone(),
            roll_no: student.roll_no.clone(),
            class_name: student.class_name.clone(),
            email: student.email.clone(),
            dob,
            percentage_text: summary.percentage_text_at(GradingConfig::PRINTABLE_PRECISION),
            remark: summary.remark().map(|remark| remark.label().to_string()),
            share_payload: share_payload(student),
            summary,
        }
    }
}

/// Payload encoded into the result QR code.
pub fn share_payload(student: &StudentRecord) -> String {
    format!(
        "ROLL:{},EMAIL:{},CLASS:{}",
        student.roll_no.trim(),
        student.email.trim(),
        student.class_name.trim()
    )
}
