use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::images::Image;

pub const LABEL_MIN_LEN: usize = 1;
pub const LABEL_MAX_LEN: usize = 25;
pub const GREETING_MAX_LEN: usize = 2000;
pub const QUESTION_TEXT_MAX_LEN: usize = 200;
pub const OPTION_TEXT_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestGroup {
    pub id: u32,
    pub label: String,
    pub probability: u8,
    pub greeting: Option<String>,
    pub allow_previous_phase: bool,
    pub allow_previous_question: bool,
    pub allow_skip_question: bool,
    pub randomize_phases: bool,
    pub phases: Vec<TestPhase>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestPhase {
    pub id: u32,
    pub randomize_questions: bool,
    pub questions: Vec<TestQuestion>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestQuestion {
    pub id: u32,
    pub text: Option<String>,
    pub image: Option<Image>,
    pub randomize_options: bool,
    pub options: Vec<TestOption>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestOption {
    pub id: u32,
    pub text: Option<String>,
    pub image: Option<Image>,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTestGroup {
    pub label: String,
    pub greeting: Option<String>,
    pub allow_previous_phase: bool,
    pub allow_previous_question: bool,
    pub allow_skip_question: bool,
    pub phases: Vec<AssignedTestPhase>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignedTestPhase {
    pub questions: Vec<AssignedTestQuestion>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignedTestQuestion {
    pub id: u32,
    pub text: Option<String>,
    pub image: Option<Image>,
    pub options: Vec<AssignedTestOption>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignedTestOption {
    pub id: u32,
    pub text: Option<String>,
    pub image: Option<Image>,
}

// --- updates ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestGroupUpdate {
    pub id: Option<u32>,
    pub probability: u8,
    pub label: String,
    pub greeting: Option<String>,
    pub allow_previous_phase: bool,
    pub allow_previous_question: bool,
    pub allow_skip_question: bool,
    pub randomize_phases: bool,
    #[serde(default)]
    pub phases: Vec<TestPhaseUpdate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestPhaseUpdate {
    pub id: Option<u32>,
    pub randomize_questions: bool,
    #[serde(default)]
    pub questions: Vec<TestQuestionUpdate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestQuestionUpdate {
    pub id: Option<u32>,
    pub text: Option<String>,
    pub randomize_options: bool,
    #[serde(default)]
    pub options: Vec<TestOptionUpdate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TestOptionUpdate {
    pub id: Option<u32>,
    pub text: Option<String>,
    pub correct: bool,
}
