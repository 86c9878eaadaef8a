use serde::Serialize;
use utoipa::ToSchema;

use crate::application::dto::events::QuestionEventLog;
use crate::application::dto::forms::FormAnswer;
use crate::application::dto::users::User;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub attempt_id: u64,
    pub timestamp: i64,
    pub answers: Vec<FormAnswer>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub attempt_id: u64,
    pub group: String,
    pub timestamp: i64,
    pub time_taken: i64,
    pub correct_questions: u32,
    pub questions_answered: u32,
    pub accuracy: f64,
    pub question_events: Vec<QuestionEventLog>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultsByConfig {
    pub config_version: u32,
    pub pre_test_form: Vec<FormSubmission>,
    pub post_test_form: Vec<FormSubmission>,
    pub attempts_results: Vec<TestResult>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultsByUser {
    pub user: User,
    pub results: Vec<ResultsByConfig>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmissionsByConfig {
    pub config_version: u32,
    pub pre_test_form: Vec<FormSubmission>,
    pub post_test_form: Vec<FormSubmission>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormSubmissionsByUser {
    pub user: User,
    pub submissions: Vec<FormSubmissionsByConfig>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResultsByConfig {
    pub config_version: u32,
    pub attempts_results: Vec<TestResult>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestResultsByUser {
    pub user: User,
    pub results: Vec<TestResultsByConfig>,
}

impl ResultsByUser {
    pub fn forms(&self) -> FormSubmissionsByUser {
        FormSubmissionsByUser {
            user: self.user.clone(),
            submissions: self
                .results
                .iter()
                .map(|r| FormSubmissionsByConfig {
                    config_version: r.config_version,
                    pre_test_form: r.pre_test_form.clone(),
                    post_test_form: r.post_test_form.clone(),
                })
                .collect(),
        }
    }

    pub fn tests(&self) -> TestResultsByUser {
        TestResultsByUser {
            user: self.user.clone(),
            results: self
                .results
                .iter()
                .map(|r| TestResultsByConfig {
                    config_version: r.config_version,
                    attempts_results: r.attempts_results.clone(),
                })
                .collect(),
        }
    }
}
