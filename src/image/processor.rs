use super::ImageService;
use crate::models::ImageSize;
use crate::{Error, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};

pub struct ImageProcessor {
    scratch_path: PathBuf,
}

impl ImageProcessor {
    pub fn new(scratch_path: &Path) -> Self {
        Self {
            scratch_path: scratch_path.to_path_buf(),
        }
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch_path
    }

    fn process_sync(
        image_data: Vec<u8>,
        scratch_path: PathBuf,
        size: ImageSize,
    ) -> Result<DynamicImage> {
        if let Some(parent) = scratch_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&scratch_path, &image_data)?;

        // The scratch name says png; trust the bytes instead.
        let image = ImageReader::open(&scratch_path)?
            .with_guessed_format()?
            .decode()?;
        tracing::debug!(
            "Decoded {}x{} image from {}",
            image.width(),
            image.height(),
            scratch_path.display()
        );

        Ok(image.resize_exact(size.width, size.height, FilterType::Lanczos3))
    }

    fn save_sync(image: DynamicImage, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        image.save(&path)?;
        Ok(())
    }
}

#[async_trait]
impl ImageService for ImageProcessor {
    async fn process_image(&self, image_data: &[u8], size: ImageSize) -> Result<DynamicImage> {
        let image_data = image_data.to_vec();
        let scratch_path = self.scratch_path.clone();

        let resized = tokio::task::spawn_blocking(move || {
            Self::process_sync(image_data, scratch_path, size)
        })
        .await
        .map_err(|e| Error::Invariant(format!("Image processing task join error: {}", e)))??;

        tracing::info!(
            "Resized image to {}x{} (scratch copy at {})",
            size.width,
            size.height,
            self.scratch_path.display()
        );
        Ok(resized)
    }

    async fn save_image(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let image = image.clone();
        let target = path.to_path_buf();

        tokio::task::spawn_blocking(move || Self::save_sync(image, target))
            .await
            .map_err(|e| Error::Invariant(format!("Image save task join error: {}", e)))??;

        tracing::info!("Saved image to {}", path.display());
        Ok(())
    }
}
