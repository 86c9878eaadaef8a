use std::collections::HashSet;

use async_trait::async_trait;

use crate::application::dto::forms::FormQuestionFields;
use crate::domain::forms::form::{FormQuestionType, FormType};

#[derive(Debug, Clone)]
pub struct FormRow {
    pub id: u32,
    pub config_version: u32,
    pub title: Option<String>,
    pub kind: FormType,
}

#[derive(Debug, Clone)]
pub struct FormQuestionRow {
    pub id: u32,
    pub form_id: u32,
    pub category: String,
    pub text: Option<String>,
    pub image_id: Option<u32>,
    pub kind: FormQuestionType,
    pub min: Option<u16>,
    pub max: Option<u16>,
    pub step: Option<u16>,
    pub other: Option<bool>,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FormOptionRow {
    pub id: u32,
    pub question_id: u32,
    pub text: Option<String>,
    pub image_id: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SliderLabelRow {
    pub id: u32,
    pub question_id: u32,
    pub number: u16,
    pub label: String,
}

/// Forms of a configuration with their questions, options and slider labels.
/// Lists are returned in display order.
#[async_trait]
pub trait FormRepository: Send + Sync {
    async fn find_by_config(&self, version: u32, kind: FormType)
    -> anyhow::Result<Option<FormRow>>;
    async fn list_questions(&self, form_id: u32) -> anyhow::Result<Vec<FormQuestionRow>>;
    async fn list_options(&self, form_id: u32) -> anyhow::Result<Vec<FormOptionRow>>;
    async fn list_slider_labels(&self, form_id: u32) -> anyhow::Result<Vec<SliderLabelRow>>;

    async fn create_form(
        &self,
        version: u32,
        kind: FormType,
        title: Option<&str>,
    ) -> anyhow::Result<u32>;
    async fn update_form_title(&self, form_id: u32, title: Option<&str>) -> anyhow::Result<()>;
    async fn delete_form(&self, form_id: u32) -> anyhow::Result<()>;

    async fn insert_question(
        &self,
        form_id: u32,
        order: u16,
        fields: &FormQuestionFields,
        image_id: Option<u32>,
    ) -> anyhow::Result<u32>;
    async fn update_question(
        &self,
        id: u32,
        order: u16,
        fields: &FormQuestionFields,
        image_id: Option<u32>,
    ) -> anyhow::Result<()>;
    async fn delete_questions(&self, ids: &[u32]) -> anyhow::Result<()>;

    async fn insert_option(
        &self,
        question_id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
    ) -> anyhow::Result<u32>;
    async fn update_option(
        &self,
        id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
    ) -> anyhow::Result<()>;
    async fn delete_options(&self, ids: &[u32]) -> anyhow::Result<()>;

    async fn insert_slider_label(
        &self,
        question_id: u32,
        number: u16,
        label: &str,
    ) -> anyhow::Result<u32>;
    async fn update_slider_label(&self, id: u32, number: u16, label: &str) -> anyhow::Result<()>;
    async fn delete_slider_labels(&self, ids: &[u32]) -> anyhow::Result<()>;

    async fn form_has_submissions(&self, form_id: u32) -> anyhow::Result<bool>;
    /// Subset of `ids` referenced by at least one stored answer.
    async fn questions_with_answers(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>>;
    async fn options_with_answers(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>>;
}
