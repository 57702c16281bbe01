use async_trait::async_trait;

use crate::entities;

/// The authoritative per-user record in the remote store.
///
/// `save` has merge-upsert semantics: it creates the row when absent and
/// overwrites the record fields when present. There is deliberately no
/// locking or versioning here; concurrent sessions race and are reconciled
/// as a union by the merge on their next sync.
#[async_trait]
pub trait DrawRecordsRepository {
    type Error;

    async fn load(
        &mut self,
        user_id: &entities::UserId,
        now_ms: i64,
    ) -> Result<Option<entities::DrawRecord>, Self::Error>;

    async fn save(&mut self, record: &entities::DrawRecord) -> Result<(), Self::Error>;

    /// Resets the user's record to the empty state (upsert, not delete).
    async fn clear(&mut self, user_id: &entities::UserId, now_ms: i64)
        -> Result<(), Self::Error>;
}
