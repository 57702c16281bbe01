use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::ports;

/// Fallback store that inlines the image as a data URL instead of uploading
/// it anywhere. Matches the original deployment's base64 storage mode; only
/// suitable for small bounded uploads.
#[derive(Debug, Clone, Default)]
pub struct DataUrlImageStore;

#[async_trait]
impl ports::ImageStore for DataUrlImageStore {
    async fn upload(
        &self,
        bytes: &[u8],
        content_type: &str,
        _public_id: &str,
    ) -> anyhow::Result<String> {
        Ok(format!(
            "data:{};base64,{}",
            content_type,
            STANDARD.encode(bytes)
        ))
    }
}
