use std::collections::HashMap;

use chrono::Utc;

use crate::application::dto::images::{Image, ImageSlot, UploadedFile};
use crate::application::errors::ApiError;
use crate::application::ports::image_repository::{ImageRepository, ImageRow};
use crate::application::ports::image_storage::ImageStorage;
use crate::domain::images::image::{
    self, ImageCategory, MAX_IMAGE_BYTES, MAX_IMAGE_SIZE_LABEL,
};

/// File and row side effects of one configuration update.
#[derive(Debug, Default)]
pub struct ImageChanges {
    /// Images an item stopped pointing at.
    pub released: Vec<u32>,
    /// Files written by the update.
    pub written: Vec<String>,
    /// Files superseded by a newer upload.
    pub replaced: Vec<String>,
}

pub struct Images<'a> {
    pub repo: &'a dyn ImageRepository,
    pub storage: &'a dyn ImageStorage,
    pub base_url: &'a str,
}

/// Checks an uploaded file before anything is written.
pub fn validate_upload(file: &UploadedFile) -> Result<(), ApiError> {
    if file.bytes.is_empty() {
        return Err(ApiError::bad_request("File cannot be empty"));
    }
    if file.bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::PayloadTooLarge(format!(
            "File size cannot exceed {MAX_IMAGE_SIZE_LABEL}"
        )));
    }
    if image::detect_image_mime(&file.bytes).is_none() {
        return Err(ApiError::bad_request("File must be an image"));
    }
    Ok(())
}

impl<'a> Images<'a> {
    pub fn to_dto(&self, row: &ImageRow) -> Image {
        Image {
            url: format!("{}/{}", self.base_url.trim_end_matches('/'), row.path),
            alt: row.alt.clone(),
        }
    }

    /// Resolves image ids into their public representation.
    pub async fn load<I>(&self, ids: I) -> anyhow::Result<HashMap<u32, Image>>
    where
        I: IntoIterator<Item = Option<u32>>,
    {
        let mut wanted: Vec<u32> = ids.into_iter().flatten().collect();
        wanted.sort_unstable();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = self.repo.find_many(&wanted).await?;
        Ok(rows.iter().map(|r| (r.id, self.to_dto(r))).collect())
    }

    pub async fn save(
        &self,
        category: ImageCategory,
        file: &UploadedFile,
        changes: &mut ImageChanges,
    ) -> Result<ImageRow, ApiError> {
        validate_upload(file)?;
        let path = self.write_new(category, file).await?;
        changes.written.push(path.clone());
        let row = self.repo.create(&path, category.default_alt()).await?;
        tracing::debug!(image_id = row.id, path = %row.path, "image_saved");
        Ok(row)
    }

    /// Points `current` at a new file; identical content leaves it untouched.
    /// The superseded file stays on disk until the changes are settled.
    pub async fn update(
        &self,
        category: ImageCategory,
        current: &ImageRow,
        file: &UploadedFile,
        changes: &mut ImageChanges,
    ) -> Result<ImageRow, ApiError> {
        validate_upload(file)?;
        if let Some(existing) = self.storage.read(&current.path).await? {
            if existing == file.bytes {
                return Ok(current.clone());
            }
        }
        let path = self.write_new(category, file).await?;
        changes.written.push(path.clone());
        self.repo.update_path(current.id, &path).await?;
        changes.replaced.push(current.path.clone());
        Ok(ImageRow {
            id: current.id,
            path,
            alt: current.alt.clone(),
        })
    }

    /// Applies one multipart slot to an item's image and returns the new image id.
    pub async fn apply_slot(
        &self,
        category: ImageCategory,
        current: Option<u32>,
        slot: ImageSlot,
        changes: &mut ImageChanges,
    ) -> Result<Option<u32>, ApiError> {
        match slot {
            ImageSlot::Keep => Ok(current),
            ImageSlot::Remove => {
                changes.released.extend(current);
                Ok(None)
            }
            ImageSlot::Replace(file) => {
                let existing = match current {
                    Some(id) => self.repo.find(id).await?,
                    None => None,
                };
                let row = match existing {
                    Some(row) => self.update(category, &row, &file, changes).await?,
                    None => self.save(category, &file, changes).await?,
                };
                Ok(Some(row.id))
            }
        }
    }

    /// Deletes the image row and file once nothing references it any more.
    pub async fn delete_if_unused(&self, id: u32) -> anyhow::Result<()> {
        if self.repo.is_referenced(id).await? {
            return Ok(());
        }
        let Some(row) = self.repo.find(id).await? else {
            return Ok(());
        };
        self.repo.delete(id).await?;
        if let Err(err) = self.storage.remove(&row.path).await {
            tracing::warn!(error = ?err, image_id = id, "image_file_remove_failed");
        }
        Ok(())
    }

    pub async fn release_all(&self, ids: &[u32]) {
        for id in ids {
            if let Err(err) = self.delete_if_unused(*id).await {
                tracing::error!(error = ?err, image_id = *id, "image_delete_failed");
            }
        }
    }

    /// Finishes a committed update: superseded files go, unreferenced rows are released.
    pub async fn settle(&self, changes: &ImageChanges) {
        self.remove_files(&changes.replaced).await;
        self.release_all(&changes.released).await;
    }

    /// Undoes the file side of an update whose rows were rolled back.
    pub async fn discard(&self, changes: &ImageChanges) {
        self.remove_files(&changes.written).await;
    }

    async fn remove_files(&self, paths: &[String]) {
        for path in paths {
            if let Err(err) = self.storage.remove(path).await {
                tracing::warn!(error = ?err, path = %path, "image_file_remove_failed");
            }
        }
    }

    async fn write_new(
        &self,
        category: ImageCategory,
        file: &UploadedFile,
    ) -> anyhow::Result<String> {
        let path = self
            .free_path(image::build_image_path(
                category,
                file.file_name.as_deref(),
                Utc::now(),
            ))
            .await?;
        self.storage.write(&path, &file.bytes).await?;
        Ok(path)
    }

    async fn free_path(&self, base: String) -> anyhow::Result<String> {
        if !self.storage.exists(&base).await? {
            return Ok(base);
        }
        let mut n = 1;
        loop {
            let candidate = image::numbered_path(&base, n);
            if !self.storage.exists(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{Fixture, PNG};

    fn file(bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: Some("logo.png".into()),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn rejects_empty_oversized_and_non_image_files() {
        assert!(matches!(
            validate_upload(&file(&[])),
            Err(ApiError::BadRequest(m)) if m == "File cannot be empty"
        ));
        let mut big = PNG.to_vec();
        big.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(matches!(
            validate_upload(&file(&big)),
            Err(ApiError::PayloadTooLarge(m)) if m == "File size cannot exceed 5 MB"
        ));
        assert!(matches!(
            validate_upload(&file(b"plain text")),
            Err(ApiError::BadRequest(m)) if m == "File must be an image"
        ));
    }

    #[tokio::test]
    async fn saves_and_builds_public_url() {
        let fx = Fixture::default();
        let images = fx.images();
        let row = images
            .save(ImageCategory::InformationCard, &file(&PNG), &mut ImageChanges::default())
            .await
            .unwrap();
        assert!(row.path.starts_with("images/cards/"));
        assert!(row.path.ends_with("_logo.png"));
        let dto = images.to_dto(&row);
        assert_eq!(dto.url, format!("http://localhost:8080/{}", row.path));
        assert_eq!(dto.alt, "Information card icon");
    }

    #[tokio::test]
    async fn same_name_in_same_second_gets_a_distinct_path() {
        let fx = Fixture::default();
        let images = fx.images();
        let a = images.save(ImageCategory::TestOption, &file(&PNG), &mut ImageChanges::default()).await.unwrap();
        let b = images.save(ImageCategory::TestOption, &file(&PNG), &mut ImageChanges::default()).await.unwrap();
        assert_ne!(a.path, b.path);
    }

    #[tokio::test]
    async fn update_with_identical_bytes_keeps_the_file() {
        let fx = Fixture::default();
        let images = fx.images();
        let mut changes = ImageChanges::default();
        let row = images.save(ImageCategory::Icon, &file(&PNG), &mut ImageChanges::default()).await.unwrap();
        let same = images
            .update(ImageCategory::Icon, &row, &file(&PNG), &mut changes)
            .await
            .unwrap();
        assert_eq!(same, row);
        assert!(changes.written.is_empty());

        let mut other = PNG.to_vec();
        other.push(1);
        let changed = images
            .update(ImageCategory::Icon, &row, &file(&other), &mut changes)
            .await
            .unwrap();
        assert_eq!(changed.id, row.id);
        assert_ne!(changed.path, row.path);
        // the old file survives until the update is settled
        assert!(fx.storage.exists(&row.path).await.unwrap());

        images.settle(&changes).await;
        assert!(!fx.storage.exists(&row.path).await.unwrap());
        assert!(fx.storage.exists(&changed.path).await.unwrap());
    }

    #[tokio::test]
    async fn discard_removes_only_new_files() {
        let fx = Fixture::default();
        let images = fx.images();
        let row = images.save(ImageCategory::Icon, &file(&PNG), &mut ImageChanges::default()).await.unwrap();

        let mut changes = ImageChanges::default();
        let mut other = PNG.to_vec();
        other.push(1);
        images
            .apply_slot(
                ImageCategory::Icon,
                Some(row.id),
                ImageSlot::Replace(file(&other)),
                &mut changes,
            )
            .await
            .unwrap();
        images
            .apply_slot(
                ImageCategory::TestOption,
                None,
                ImageSlot::Replace(file(&PNG)),
                &mut changes,
            )
            .await
            .unwrap();
        assert_eq!(changes.written.len(), 2);

        images.discard(&changes).await;
        assert!(fx.storage.exists(&row.path).await.unwrap());
        for path in &changes.written {
            assert!(!fx.storage.exists(path).await.unwrap());
        }
    }

    #[tokio::test]
    async fn slots_keep_remove_and_replace() {
        let fx = Fixture::default();
        let images = fx.images();
        let mut changes = ImageChanges::default();

        let kept = images
            .apply_slot(ImageCategory::Icon, Some(7), ImageSlot::Keep, &mut changes)
            .await
            .unwrap();
        assert_eq!(kept, Some(7));

        let removed = images
            .apply_slot(ImageCategory::Icon, Some(7), ImageSlot::Remove, &mut changes)
            .await
            .unwrap();
        assert_eq!(removed, None);
        assert_eq!(changes.released, vec![7]);

        let created = images
            .apply_slot(
                ImageCategory::Icon,
                None,
                ImageSlot::Replace(file(&PNG)),
                &mut changes,
            )
            .await
            .unwrap();
        assert!(created.is_some());
        assert_eq!(changes.written.len(), 1);
    }

    #[tokio::test]
    async fn referenced_images_are_not_deleted() {
        let fx = Fixture::default();
        let images = fx.images();
        let row = images.save(ImageCategory::Icon, &file(&PNG), &mut ImageChanges::default()).await.unwrap();
        fx.store.pin_image(row.id);
        images.delete_if_unused(row.id).await.unwrap();
        assert!(images.repo.find(row.id).await.unwrap().is_some());

        fx.store.unpin_image(row.id);
        images.delete_if_unused(row.id).await.unwrap();
        assert!(images.repo.find(row.id).await.unwrap().is_none());
        assert!(!fx.storage.exists(&row.path).await.unwrap());
    }
}
