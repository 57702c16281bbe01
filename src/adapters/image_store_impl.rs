use async_trait::async_trait;

use super::{CloudinaryImageStore, DataUrlImageStore};
use crate::app_config::ImageStoreConfig;
use crate::ports;

/// Config-selected image store backend.
#[derive(Debug, Clone)]
pub enum ImageStoreImpl {
    Cloudinary(CloudinaryImageStore),
    DataUrl(DataUrlImageStore),
}

impl ImageStoreImpl {
    pub fn from_config(config: &ImageStoreConfig) -> Self {
        match config {
            ImageStoreConfig::Cloudinary {
                cloud_name,
                upload_preset,
            } => Self::Cloudinary(CloudinaryImageStore::new(
                cloud_name,
                upload_preset.clone(),
            )),
            ImageStoreConfig::DataUrl => Self::DataUrl(DataUrlImageStore),
        }
    }
}

#[async_trait]
impl ports::ImageStore for ImageStoreImpl {
    async fn upload(
        &self,
        bytes: &[u8],
        content_type: &str,
        public_id: &str,
    ) -> anyhow::Result<String> {
        match self {
            Self::Cloudinary(store) => store.upload(bytes, content_type, public_id).await,
            Self::DataUrl(store) => store.upload(bytes, content_type, public_id).await,
        }
    }
}
