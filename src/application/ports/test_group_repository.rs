use std::collections::HashSet;

use async_trait::async_trait;

use crate::application::dto::test_groups::TestGroupUpdate;

/// Prefix of the temporary `<prefix><id>` label a group holds while it is renamed.
pub const PARKED_LABEL_PREFIX: &str = "~parked~";

#[derive(Debug, Clone)]
pub struct TestGroupRow {
    pub id: u32,
    pub config_version: u32,
    pub label: String,
    pub probability: u8,
    pub greeting: Option<String>,
    pub allow_previous_phase: bool,
    pub allow_previous_question: bool,
    pub allow_skip_question: bool,
    pub randomize_phases: bool,
}

#[derive(Debug, Clone)]
pub struct TestPhaseRow {
    pub id: u32,
    pub group_id: u32,
    pub randomize_questions: bool,
}

#[derive(Debug, Clone)]
pub struct TestQuestionRow {
    pub id: u32,
    pub phase_id: u32,
    pub text: Option<String>,
    pub image_id: Option<u32>,
    pub randomize_options: bool,
}

#[derive(Debug, Clone)]
pub struct TestOptionRow {
    pub id: u32,
    pub question_id: u32,
    pub text: Option<String>,
    pub image_id: Option<u32>,
    pub correct: bool,
}

/// Test groups and their phases, questions and options. Lists keep display order.
#[async_trait]
pub trait TestGroupRepository: Send + Sync {
    async fn list_groups(&self, version: u32) -> anyhow::Result<Vec<TestGroupRow>>;
    async fn find_group(&self, id: u32) -> anyhow::Result<Option<TestGroupRow>>;
    async fn list_phases(&self, group_id: u32) -> anyhow::Result<Vec<TestPhaseRow>>;
    async fn list_questions(&self, group_id: u32) -> anyhow::Result<Vec<TestQuestionRow>>;
    async fn list_options(&self, group_id: u32) -> anyhow::Result<Vec<TestOptionRow>>;
    /// Group owning the question, if the question exists.
    async fn question_group_id(&self, question_id: u32) -> anyhow::Result<Option<u32>>;
    async fn option_group_id(&self, option_id: u32) -> anyhow::Result<Option<u32>>;

    async fn insert_group(&self, version: u32, group: &TestGroupUpdate) -> anyhow::Result<u32>;
    async fn update_group(&self, id: u32, group: &TestGroupUpdate) -> anyhow::Result<()>;
    /// Moves the labels of `ids` out of the way so renamed groups can trade labels
    /// without tripping the per-config uniqueness constraint.
    async fn park_labels(&self, ids: &[u32]) -> anyhow::Result<()>;
    async fn delete_groups(&self, ids: &[u32]) -> anyhow::Result<()>;

    async fn insert_phase(
        &self,
        group_id: u32,
        order: u16,
        randomize_questions: bool,
    ) -> anyhow::Result<u32>;
    async fn update_phase(
        &self,
        id: u32,
        order: u16,
        randomize_questions: bool,
    ) -> anyhow::Result<()>;
    async fn delete_phases(&self, ids: &[u32]) -> anyhow::Result<()>;

    async fn insert_question(
        &self,
        phase_id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        randomize_options: bool,
    ) -> anyhow::Result<u32>;
    async fn update_question(
        &self,
        id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        randomize_options: bool,
    ) -> anyhow::Result<()>;
    async fn delete_questions(&self, ids: &[u32]) -> anyhow::Result<()>;

    async fn insert_option(
        &self,
        question_id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        correct: bool,
    ) -> anyhow::Result<u32>;
    async fn update_option(
        &self,
        id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        correct: bool,
    ) -> anyhow::Result<()>;
    async fn delete_options(&self, ids: &[u32]) -> anyhow::Result<()>;

    /// Subsets of `ids` that test attempts or event logs depend on.
    async fn groups_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>>;
    async fn phases_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>>;
    async fn questions_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>>;
    async fn options_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>>;
}
