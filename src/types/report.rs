//! Performance report and stored-response payloads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of `GET /relatorio/{email}`.
///
/// A child without any answered question gets a short placeholder
/// instead of the full report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Report {
    Full(Box<FullReport>),
    Pending(PendingReport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullReport {
    #[serde(default)]
    pub generated_at: Option<NaiveDateTime>,
    pub child_info: ChildInfo,
    pub performance_summary: PerformanceSummary,
    #[serde(default)]
    pub temporal_analysis: Option<TemporalAnalysis>,
    /// Weekday name → `{total, accuracy}`.
    #[serde(default)]
    pub daily_patterns: Value,
    #[serde(default)]
    pub pedagogical_insights: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildInfo {
    pub name: String,
    pub grade: String,
    pub email_responsavel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_activities: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub accuracy_percentage: f64,
    #[serde(default)]
    pub recent_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalAnalysis {
    pub total_recent_activities: u32,
    pub total_older_activities: u32,
    pub performance_trend: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReport {
    pub child_name: String,
    pub child_grade: u8,
    pub total_responses: u32,
    pub message: String,
}

impl Report {
    pub fn summary(&self) -> Option<&PerformanceSummary> {
        match self {
            Self::Full(report) => Some(&report.performance_summary),
            Self::Pending(_) => None,
        }
    }
}

/// Response of `GET /respostas/{email}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsesPage {
    pub email: String,
    pub total_responses: u32,
    pub responses: Vec<ResponseRecord>,
}

/// One stored answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: i64,
    pub question_id: i64,
    pub selected: String,
    pub correct: bool,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub feedback_text: String,
    #[serde(default)]
    pub audio_path: Option<String>,
}
