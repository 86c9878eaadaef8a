use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_IMAGE_SIZE_LABEL: &str = "5 MB";

const SUPPORTED_MIME_TYPES: [&str; 3] = ["image/gif", "image/png", "image/jpeg"];

static UNSAFE_FILE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9._-]").expect("valid file name regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCategory {
    Icon,
    InformationCard,
    FormQuestion,
    FormOption,
    TestQuestion,
    TestOption,
}

impl ImageCategory {
    pub fn directory(&self) -> &'static str {
        match self {
            ImageCategory::Icon => "icon",
            ImageCategory::InformationCard => "cards",
            ImageCategory::FormQuestion => "forms/questions",
            ImageCategory::FormOption => "forms/questions/options",
            ImageCategory::TestQuestion => "test/questions",
            ImageCategory::TestOption => "test/questions/options",
        }
    }

    pub fn default_alt(&self) -> &'static str {
        match self {
            ImageCategory::Icon => "Application icon",
            ImageCategory::InformationCard => "Information card icon",
            ImageCategory::FormQuestion => "Form question image",
            ImageCategory::FormOption => "Form option image",
            ImageCategory::TestQuestion => "Test question image",
            ImageCategory::TestOption => "Test option image",
        }
    }
}

pub fn sanitize_file_name(name: &str) -> String {
    let trimmed = name.trim();
    let base = if trimmed.is_empty() { "image" } else { trimmed };
    UNSAFE_FILE_NAME_CHARS.replace_all(base, "_").into_owned()
}

/// Relative storage path, e.g. `images/cards/20250102_030405_logo.png`.
pub fn build_image_path(
    category: ImageCategory,
    file_name: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    format!(
        "images/{}/{}_{}",
        category.directory(),
        now.format("%Y%m%d_%H%M%S"),
        sanitize_file_name(file_name.unwrap_or("image"))
    )
}

/// Variant of `path` used when the original is taken: `a/b/x.png` -> `a/b/x_2.png`.
pub fn numbered_path(path: &str, n: u32) -> String {
    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, path),
    };
    let file = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{n}.{ext}"),
        _ => format!("{file}_{n}"),
    };
    match dir {
        Some(dir) => format!("{dir}/{file}"),
        None => file,
    }
}

/// Detects the image MIME type from the content; only gif, png and jpeg are accepted.
pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    let kind = infer::get(bytes)?;
    SUPPORTED_MIME_TYPES
        .iter()
        .find(|m| **m == kind.mime_type())
        .copied()
}
