use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::events::option_event::OptionEventType;

/// A payload field that either parsed as `T` or kept its raw JSON, so validation
/// can report a bad value against the field instead of rejecting the whole body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(serde_json::Value),
}

impl<T> Lenient<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Lenient::Valid(value) => Some(value),
            Lenient::Invalid(_) => None,
        }
    }
}

impl<T> From<T> for Lenient<T> {
    fn from(value: T) -> Self {
        Lenient::Valid(value)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestionEventLog {
    #[schema(value_type = Option<u32>)]
    pub question_id: Option<Lenient<i64>>,
    /// Epoch milliseconds
    #[schema(value_type = Option<i64>)]
    pub timestamp: Option<Lenient<i64>>,
    /// Milliseconds spent on the question
    #[schema(value_type = Option<u32>)]
    pub duration: Option<Lenient<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOptionEventLog {
    #[schema(value_type = Option<u32>)]
    pub option_id: Option<Lenient<i64>>,
    #[serde(rename = "type")]
    #[schema(value_type = Option<OptionEventType>)]
    pub kind: Option<Lenient<OptionEventType>>,
    #[schema(value_type = Option<i64>)]
    pub timestamp: Option<Lenient<i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuestionTimestamp {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionEventLog {
    pub option_id: u32,
    #[serde(rename = "type")]
    pub kind: OptionEventType,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionSelectionEvent {
    pub option_id: u32,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEventLog {
    pub question_id: u32,
    pub timestamps: Vec<QuestionTimestamp>,
    pub correct: bool,
    pub skipped: bool,
    pub total_option_changes: u32,
    pub total_option_hovers: u32,
    pub option_selections: Vec<OptionSelectionEvent>,
    pub events: Vec<OptionEventLog>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEventLogWithUserId {
    pub user_id: u32,
    pub question_id: u32,
    pub timestamps: Vec<QuestionTimestamp>,
    pub correct: bool,
    pub skipped: bool,
    pub total_option_changes: u32,
    pub total_option_hovers: u32,
    pub option_selections: Vec<OptionSelectionEvent>,
    pub events: Vec<OptionEventLog>,
}

impl QuestionEventLogWithUserId {
    pub fn new(user_id: u32, log: QuestionEventLog) -> Self {
        Self {
            user_id,
            question_id: log.question_id,
            timestamps: log.timestamps,
            correct: log.correct,
            skipped: log.skipped,
            total_option_changes: log.total_option_changes,
            total_option_hovers: log.total_option_hovers,
            option_selections: log.option_selections,
            events: log.events,
        }
    }
}
