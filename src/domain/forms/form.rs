use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    Pre,
    Post,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Pre => "pre",
            FormType::Post => "post",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pre" => Some(FormType::Pre),
            "post" => Some(FormType::Post),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FormQuestionType {
    #[serde(rename = "select-one")]
    SelectOne,
    #[serde(rename = "select-multiple")]
    SelectMultiple,
    #[serde(rename = "slider")]
    Slider,
    #[serde(rename = "text-short")]
    TextShort,
    #[serde(rename = "text-long")]
    TextLong,
}

impl FormQuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormQuestionType::SelectOne => "select-one",
            FormQuestionType::SelectMultiple => "select-multiple",
            FormQuestionType::Slider => "slider",
            FormQuestionType::TextShort => "text-short",
            FormQuestionType::TextLong => "text-long",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "select-one" => Some(FormQuestionType::SelectOne),
            "select-multiple" => Some(FormQuestionType::SelectMultiple),
            "slider" => Some(FormQuestionType::Slider),
            "text-short" => Some(FormQuestionType::TextShort),
            "text-long" => Some(FormQuestionType::TextLong),
            _ => None,
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(
            self,
            FormQuestionType::SelectOne | FormQuestionType::SelectMultiple
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FormQuestionType::TextShort | FormQuestionType::TextLong)
    }
}
