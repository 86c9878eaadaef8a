use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OptionEventType {
    Select,
    Deselect,
    Hover,
}

impl OptionEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionEventType::Select => "select",
            OptionEventType::Deselect => "deselect",
            OptionEventType::Hover => "hover",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "select" => Some(OptionEventType::Select),
            "deselect" => Some(OptionEventType::Deselect),
            "hover" => Some(OptionEventType::Hover),
            _ => None,
        }
    }

    /// Select and deselect change the answer; hovers do not.
    pub fn is_change(&self) -> bool {
        !matches!(self, OptionEventType::Hover)
    }
}
