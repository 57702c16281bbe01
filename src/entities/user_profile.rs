use chrono::{DateTime, Utc};

use super::UserId;

#[derive(Clone, Debug)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
}
