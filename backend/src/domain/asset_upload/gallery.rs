//! Single-slot and multi-image usage shapes over [`AssetUploader`].
//!
//! Both shapes only mutate their state after a successful upload.

use url::Url;

use super::{AssetUploader, CandidateFile, UploadConstraints, UploadError};

/// Gallery capacity when the caller does not choose one.
pub const DEFAULT_MAX_IMAGES: usize = 1;

/// One replaceable image, such as an avatar or a cover picture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSlot {
    current: Option<Url>,
}

impl ImageSlot {
    /// Slot showing `current`, if any.
    #[must_use]
    pub fn new(current: Option<Url>) -> Self {
        Self { current }
    }

    /// URL of the current image.
    #[must_use]
    pub fn current(&self) -> Option<&Url> {
        self.current.as_ref()
    }

    /// Upload `file` and replace the current image with it.
    ///
    /// # Errors
    ///
    /// Any [`UploadError`]; the current image is kept on failure.
    pub async fn upload(
        &mut self,
        uploader: &AssetUploader,
        file: &CandidateFile,
        constraints: &UploadConstraints,
    ) -> Result<Url, UploadError> {
        let url = uploader.upload(file, constraints).await?;
        self.current = Some(url.clone());
        Ok(url)
    }

    /// Remove the current image, returning it.
    pub fn clear(&mut self) -> Option<Url> {
        self.current.take()
    }
}

/// Ordered image list capped at `max_images`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGallery {
    images: Vec<Url>,
    max_images: usize,
}

impl Default for ImageGallery {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGES)
    }
}

impl ImageGallery {
    /// Empty gallery holding at most `max_images` images.
    #[must_use]
    pub fn new(max_images: usize) -> Self {
        Self {
            images: Vec::new(),
            max_images,
        }
    }

    /// Start from previously uploaded images. Existing images beyond the cap
    /// are kept; they only block further uploads.
    #[must_use]
    pub fn with_images(images: Vec<Url>, max_images: usize) -> Self {
        Self { images, max_images }
    }

    /// Uploaded images in upload order.
    #[must_use]
    pub fn images(&self) -> &[Url] {
        &self.images
    }

    /// Upload cap.
    #[must_use]
    pub fn max_images(&self) -> usize {
        self.max_images
    }

    /// Whether another upload would be accepted.
    #[must_use]
    pub fn can_upload(&self) -> bool {
        self.images.len() < self.max_images
    }

    /// Upload `file` and append it.
    ///
    /// # Errors
    ///
    /// [`UploadError::GalleryFull`] before any validation or network call
    /// when the cap is reached; otherwise any error from
    /// [`AssetUploader::upload`]. The list is unchanged on failure.
    pub async fn upload(
        &mut self,
        uploader: &AssetUploader,
        file: &CandidateFile,
        constraints: &UploadConstraints,
    ) -> Result<Url, UploadError> {
        if !self.can_upload() {
            return Err(UploadError::GalleryFull {
                max: self.max_images,
            });
        }
        let url = uploader.upload(file, constraints).await?;
        self.images.push(url.clone());
        Ok(url)
    }

    /// Remove the image at `index`, keeping the order of the rest.
    ///
    /// Returns `None` and leaves the gallery untouched for an out-of-range
    /// index.
    pub fn remove(&mut self, index: usize) -> Option<Url> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }
}
