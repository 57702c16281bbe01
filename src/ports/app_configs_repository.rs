use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities;

#[async_trait]
pub trait AppConfigsRepository {
    type Error;

    async fn get_draw_toggle(&mut self) -> Result<entities::DrawToggle, Self::Error>;

    async fn set_draw_toggle(
        &mut self,
        enabled: bool,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<(), Self::Error>;
}
