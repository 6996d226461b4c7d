use super::ImageService;
use crate::models::ImageSize;
use crate::Result;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory image service: never decodes, never touches disk.
#[derive(Clone)]
pub struct MockImageProcessor {
    process_count: Arc<Mutex<usize>>,
    saved_paths: Arc<Mutex<Vec<PathBuf>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageProcessor {
    pub fn new() -> Self {
        Self {
            process_count: Arc::new(Mutex::new(0)),
            saved_paths: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_process_count(&self) -> usize {
        *self.process_count.lock().unwrap()
    }

    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.saved_paths.lock().unwrap().clone()
    }
}

impl Default for MockImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageService for MockImageProcessor {
    async fn process_image(&self, _image_data: &[u8], size: ImageSize) -> Result<DynamicImage> {
        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Image(image::ImageError::IoError(
                std::io::Error::other("Mock failure"),
            )));
        }

        let mut count = self.process_count.lock().unwrap();
        *count += 1;

        Ok(DynamicImage::new_rgba8(size.width, size.height))
    }

    async fn save_image(&self, _image: &DynamicImage, path: &Path) -> Result<()> {
        self.saved_paths.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
