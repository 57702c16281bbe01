use async_trait::async_trait;

/// Black-box image host: takes the raw bytes and a public id, hands back a
/// durable URL.
#[async_trait]
pub trait ImageStore {
    async fn upload(
        &self,
        bytes: &[u8],
        content_type: &str,
        public_id: &str,
    ) -> anyhow::Result<String>;
}
