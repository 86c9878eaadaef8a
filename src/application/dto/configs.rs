use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::forms::{Form, FormUpdate};
use crate::application::dto::images::Image;
use crate::application::dto::test_groups::{TestGroup, TestGroupUpdate};

pub const TITLE_MAX_LEN: usize = 100;
pub const SUBTITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 2000;
pub const INFORMED_CONSENT_MAX_LEN: usize = 2000;
pub const CARD_TITLE_MAX_LEN: usize = 50;
pub const CARD_DESCRIPTION_MAX_LEN: usize = 100;
pub const CARD_COLOR_MAX: u32 = 0xff_ffff;
pub const FAQ_QUESTION_MAX_LEN: usize = 100;
pub const FAQ_ANSWER_MAX_LEN: usize = 500;
pub const PATTERN_NAME_MAX_LEN: usize = 50;
pub const PATTERN_REGEX_MAX_LEN: usize = 50;
pub const TRANSLATION_VALUE_MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pattern {
    pub id: u32,
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PatternUpdate {
    pub id: Option<u32>,
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InformationCard {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub color: u32,
    pub icon: Option<Image>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InformationCardUpdate {
    pub id: Option<u32>,
    pub title: String,
    pub description: String,
    pub color: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FrequentlyAskedQuestion {
    pub id: u32,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FrequentlyAskedQuestionUpdate {
    pub id: Option<u32>,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Translation {
    pub key: String,
    pub value: Option<String>,
    pub description: String,
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TranslationUpdate {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPreview {
    pub version: u32,
    pub icon: Option<Image>,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub active: bool,
    pub can_delete: bool,
}

/// Public view of the active configuration.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrimmedConfig {
    pub icon: Option<Image>,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub anonymous: bool,
    pub username_pattern: Option<Pattern>,
    pub information_cards: Vec<InformationCard>,
    pub informed_consent: String,
    pub faq: Vec<FrequentlyAskedQuestion>,
    pub pre_test_form: Option<Form>,
    pub post_test_form: Option<Form>,
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullConfig {
    pub version: u32,
    pub icon: Option<Image>,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub anonymous: bool,
    pub username_pattern: Option<Pattern>,
    pub information_cards: Vec<InformationCard>,
    pub informed_consent: String,
    pub faq: Vec<FrequentlyAskedQuestion>,
    pub pre_test_form: Option<Form>,
    pub post_test_form: Option<Form>,
    pub groups: Vec<TestGroup>,
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub anonymous: bool,
    pub informed_consent: String,
    pub username_pattern: Option<PatternUpdate>,
    #[serde(default)]
    pub information_cards: Vec<InformationCardUpdate>,
    #[serde(default)]
    pub faq: Vec<FrequentlyAskedQuestionUpdate>,
    pub pre_test_form: Option<FormUpdate>,
    pub post_test_form: Option<FormUpdate>,
    #[serde(default)]
    pub groups: Vec<TestGroupUpdate>,
    #[serde(default)]
    pub translations: Vec<TranslationUpdate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClonedConfig {
    pub version: u32,
}
