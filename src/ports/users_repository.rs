use async_trait::async_trait;

use crate::entities;

#[async_trait]
pub trait UsersRepository {
    type Error;

    async fn save(&mut self, profile: entities::UserProfile) -> Result<(), Self::Error>;

    async fn find_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<entities::UserId>, Self::Error>;

    async fn list_ids(&mut self) -> Result<Vec<entities::UserId>, Self::Error>;
}
