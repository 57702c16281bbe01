use async_trait::async_trait;

use super::common::PaginationResult;
use crate::entities;

#[async_trait]
pub trait CardsRepository {
    type Error;

    async fn create(&mut self, card: entities::Card) -> Result<entities::Card, Self::Error>;

    /// Newest-first cursor readthrough: returns cards with ids strictly below
    /// `after_id`, at most `limit` of them.
    async fn list(
        &mut self,
        after_id: Option<entities::CardId>,
        limit: u32,
    ) -> Result<PaginationResult<entities::Card>, Self::Error>;

    async fn list_all(&mut self) -> Result<Vec<entities::Card>, Self::Error>;

    async fn latest_by_user(
        &mut self,
        user_id: &entities::UserId,
    ) -> Result<Option<entities::Card>, Self::Error>;

    async fn user_has_card(&mut self, user_id: &entities::UserId) -> Result<bool, Self::Error>;

    async fn count(&mut self) -> Result<u64, Self::Error>;

    /// Returns false when no card with that id existed.
    async fn delete(&mut self, id: entities::CardId) -> Result<bool, Self::Error>;

    async fn delete_all(&mut self) -> Result<u64, Self::Error>;
}
