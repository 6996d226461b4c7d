//! Image persistence and resizing
//!
//! Generated images are written to a fixed scratch file, decoded back from
//! disk, and resized to the requested dimensions. Finished images can be
//! saved as additional copies under a results directory.

pub mod mock;
pub mod processor;

pub use mock::MockImageProcessor;
pub use processor::ImageProcessor;

use crate::models::ImageSize;
use crate::Result;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::Path;

#[async_trait]
pub trait ImageService: Send + Sync {
    /// Persist `image_data`, reopen it, and resize it exactly to `size`.
    async fn process_image(&self, image_data: &[u8], size: ImageSize) -> Result<DynamicImage>;

    /// Save `image` at `path`, creating parent directories as needed.
    async fn save_image(&self, image: &DynamicImage, path: &Path) -> Result<()>;
}
