use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::ports;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Unsigned upload against the Cloudinary REST endpoint. The preset carries
/// the account-side upload policy, so no request signing is needed here.
#[derive(Debug, Clone)]
pub struct CloudinaryImageStore {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl CloudinaryImageStore {
    pub fn new(cloud_name: &str, upload_preset: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/upload"),
            upload_preset,
        }
    }
}

#[async_trait]
impl ports::ImageStore for CloudinaryImageStore {
    async fn upload(
        &self,
        bytes: &[u8],
        content_type: &str,
        public_id: &str,
    ) -> anyhow::Result<String> {
        let file = multipart::Part::bytes(bytes.to_vec())
            .file_name(public_id.to_string())
            .mime_str(content_type)
            .context("invalid content type")?;

        let form = multipart::Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.clone())
            .text("public_id", public_id.to_string());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .context("cloudinary request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("cloudinary upload failed: {status}: {body}"));
        }

        let uploaded = response
            .json::<UploadResponse>()
            .await
            .context("cloudinary response decode error")?;

        Ok(uploaded.secure_url)
    }
}
