use serde::Serialize;
use utoipa::ToSchema;

use crate::application::dto::test_groups::AssignedTestGroup;
use crate::application::dto::users::User;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserTestAttempt {
    pub completed_pre_test_form: bool,
    pub completed_test: bool,
    pub completed_post_test_form: bool,
    pub test_answers: Vec<UserTestAttemptAnswer>,
    pub assigned_group: AssignedTestGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserTestAttemptAnswer {
    pub question_id: u32,
    pub option_id: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestAttemptSummary {
    pub user: User,
    pub config_version: u32,
    pub group: String,
    pub timestamp: i64,
    pub time_taken: i64,
    pub correct_questions: u32,
    pub questions_answered: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestAttemptsSummary {
    pub average_accuracy: f64,
    pub average_time_taken: f64,
    pub total_questions_answered: u32,
    pub users: Vec<TestAttemptSummary>,
}
