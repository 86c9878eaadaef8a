use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// What to do with the image of one item in a config update.
#[derive(Debug, Clone, Default)]
pub enum ImageSlot {
    #[default]
    Keep,
    Remove,
    Replace(UploadedFile),
}

impl ImageSlot {
    pub fn is_keep(&self) -> bool {
        matches!(self, ImageSlot::Keep)
    }
}

/// Image parts of one multipart list, consumed in document order.
#[derive(Debug, Default)]
pub struct ImageSlots {
    slots: std::collections::VecDeque<ImageSlot>,
}

impl ImageSlots {
    pub fn new(slots: Vec<ImageSlot>) -> Self {
        Self {
            slots: slots.into(),
        }
    }

    /// Files still waiting to be consumed.
    pub fn uploads(&self) -> impl Iterator<Item = &UploadedFile> {
        self.slots.iter().filter_map(|slot| match slot {
            ImageSlot::Replace(file) => Some(file),
            _ => None,
        })
    }

    /// Missing trailing parts leave the image untouched.
    pub fn next_slot(&mut self) -> ImageSlot {
        self.slots.pop_front().unwrap_or_default()
    }
}
