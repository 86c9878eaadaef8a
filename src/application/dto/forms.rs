use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::images::Image;
use crate::domain::forms::form::FormQuestionType;

pub const FORM_TITLE_MAX_LEN: usize = 100;
pub const CATEGORY_MIN_LEN: usize = 1;
pub const CATEGORY_MAX_LEN: usize = 50;
pub const QUESTION_TEXT_MAX_LEN: usize = 200;
pub const OPTION_TEXT_MAX_LEN: usize = 100;
pub const PLACEHOLDER_MAX_LEN: usize = 50;
pub const SLIDER_LABEL_MAX_LEN: usize = 50;
pub const ANSWER_MAX_LEN: usize = 1000;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: u32,
    pub title: Option<String>,
    pub questions: Vec<FormQuestion>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum FormQuestion {
    #[serde(rename = "select-one")]
    SelectOne(SelectOneQuestion),
    #[serde(rename = "select-multiple")]
    SelectMultiple(SelectMultipleQuestion),
    #[serde(rename = "slider")]
    Slider(SliderQuestion),
    #[serde(rename = "text-short")]
    TextShort(TextQuestion),
    #[serde(rename = "text-long")]
    TextLong(TextQuestion),
}

impl FormQuestion {
    pub fn id(&self) -> u32 {
        match self {
            FormQuestion::SelectOne(q) => q.id,
            FormQuestion::SelectMultiple(q) => q.id,
            FormQuestion::Slider(q) => q.id,
            FormQuestion::TextShort(q) | FormQuestion::TextLong(q) => q.id,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<FormOption>> {
        match self {
            FormQuestion::SelectOne(q) => Some(&mut q.options),
            FormQuestion::SelectMultiple(q) => Some(&mut q.options),
            _ => None,
        }
    }

    pub fn labels_mut(&mut self) -> Option<&mut Vec<SliderLabel>> {
        match self {
            FormQuestion::Slider(q) => Some(&mut q.labels),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectOneQuestion {
    pub id: u32,
    pub category: String,
    pub text: Option<String>,
    pub image: Option<Image>,
    pub options: Vec<FormOption>,
    pub other: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectMultipleQuestion {
    pub id: u32,
    pub category: String,
    pub text: Option<String>,
    pub image: Option<Image>,
    pub options: Vec<FormOption>,
    pub min: u16,
    pub max: u16,
    pub other: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SliderQuestion {
    pub id: u32,
    pub category: String,
    pub text: Option<String>,
    pub image: Option<Image>,
    pub min: u16,
    pub max: u16,
    pub step: u16,
    pub labels: Vec<SliderLabel>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextQuestion {
    pub id: u32,
    pub category: String,
    pub text: Option<String>,
    pub image: Option<Image>,
    pub placeholder: String,
    pub min_length: u16,
    pub max_length: u16,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormOption {
    pub id: u32,
    pub text: Option<String>,
    pub image: Option<Image>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SliderLabel {
    pub id: u32,
    pub number: u16,
    pub label: String,
}

// --- updates ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormUpdate {
    pub id: Option<u32>,
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Vec<FormQuestionUpdate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum FormQuestionUpdate {
    #[serde(rename = "select-one")]
    SelectOne(SelectOneUpdate),
    #[serde(rename = "select-multiple")]
    SelectMultiple(SelectMultipleUpdate),
    #[serde(rename = "slider")]
    Slider(SliderUpdate),
    #[serde(rename = "text-short")]
    TextShort(TextUpdate),
    #[serde(rename = "text-long")]
    TextLong(TextUpdate),
}

/// Flattened view of a question update, matching the `form_question` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormQuestionFields {
    pub kind: FormQuestionType,
    pub category: String,
    pub text: Option<String>,
    pub min: Option<u16>,
    pub max: Option<u16>,
    pub step: Option<u16>,
    pub other: Option<bool>,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    pub placeholder: Option<String>,
}

impl FormQuestionUpdate {
    pub fn id(&self) -> Option<u32> {
        match self {
            FormQuestionUpdate::SelectOne(q) => q.id,
            FormQuestionUpdate::SelectMultiple(q) => q.id,
            FormQuestionUpdate::Slider(q) => q.id,
            FormQuestionUpdate::TextShort(q) | FormQuestionUpdate::TextLong(q) => q.id,
        }
    }

    pub fn options(&self) -> &[FormOptionUpdate] {
        match self {
            FormQuestionUpdate::SelectOne(q) => &q.options,
            FormQuestionUpdate::SelectMultiple(q) => &q.options,
            _ => &[],
        }
    }

    pub fn labels(&self) -> &[SliderLabelUpdate] {
        match self {
            FormQuestionUpdate::Slider(q) => &q.labels,
            _ => &[],
        }
    }

    pub fn fields(&self) -> FormQuestionFields {
        let blank = |kind, category: &str, text: &Option<String>| FormQuestionFields {
            kind,
            category: category.to_string(),
            text: text.clone(),
            min: None,
            max: None,
            step: None,
            other: None,
            min_length: None,
            max_length: None,
            placeholder: None,
        };
        match self {
            FormQuestionUpdate::SelectOne(q) => FormQuestionFields {
                other: Some(q.other),
                ..blank(FormQuestionType::SelectOne, &q.category, &q.text)
            },
            FormQuestionUpdate::SelectMultiple(q) => FormQuestionFields {
                min: Some(q.min),
                max: Some(q.max),
                other: Some(q.other),
                ..blank(FormQuestionType::SelectMultiple, &q.category, &q.text)
            },
            FormQuestionUpdate::Slider(q) => FormQuestionFields {
                min: Some(q.min),
                max: Some(q.max),
                step: Some(q.step),
                ..blank(FormQuestionType::Slider, &q.category, &q.text)
            },
            FormQuestionUpdate::TextShort(q) => FormQuestionFields {
                min_length: Some(q.min_length),
                max_length: Some(q.max_length),
                placeholder: Some(q.placeholder.clone()),
                ..blank(FormQuestionType::TextShort, &q.category, &q.text)
            },
            FormQuestionUpdate::TextLong(q) => FormQuestionFields {
                min_length: Some(q.min_length),
                max_length: Some(q.max_length),
                placeholder: Some(q.placeholder.clone()),
                ..blank(FormQuestionType::TextLong, &q.category, &q.text)
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectOneUpdate {
    pub id: Option<u32>,
    pub category: String,
    pub text: Option<String>,
    pub other: bool,
    #[serde(default)]
    pub options: Vec<FormOptionUpdate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectMultipleUpdate {
    pub id: Option<u32>,
    pub category: String,
    pub text: Option<String>,
    pub min: u16,
    pub max: u16,
    pub other: bool,
    #[serde(default)]
    pub options: Vec<FormOptionUpdate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SliderUpdate {
    pub id: Option<u32>,
    pub category: String,
    pub text: Option<String>,
    pub min: u16,
    pub max: u16,
    pub step: u16,
    #[serde(default)]
    pub labels: Vec<SliderLabelUpdate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextUpdate {
    pub id: Option<u32>,
    pub category: String,
    pub text: Option<String>,
    pub placeholder: String,
    pub min_length: u16,
    pub max_length: u16,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FormOptionUpdate {
    pub id: Option<u32>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SliderLabelUpdate {
    pub id: Option<u32>,
    pub number: u16,
    pub label: String,
}

// --- answers ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewFormAnswers {
    pub answers: Vec<NewFormAnswer>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFormAnswer {
    pub question_id: u32,
    pub option_id: Option<u32>,
    pub value: Option<u16>,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormAnswer {
    pub question_id: u32,
    pub option_id: Option<u32>,
    pub value: Option<u16>,
    pub answer: Option<String>,
}
