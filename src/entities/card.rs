use chrono::{DateTime, Utc};
use derive_more::{From, Into};
use std::time::SystemTime;
use ulid::Ulid;

use super::UserId;

#[derive(Clone, Debug, Into, From, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CardId(Ulid);

impl CardId {
    /// Ids are creation-ordered, so sorting by id is sorting by upload time.
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self(Ulid::from_datetime(SystemTime::from(now)))
    }
}

#[derive(Clone, Debug)]
pub struct Card {
    pub id: CardId,
    pub user_id: UserId,
    pub name: String,
    pub position: String,
    pub front_image_url: String,
    pub back_image_url: String,
    pub created_at: DateTime<Utc>,
}
