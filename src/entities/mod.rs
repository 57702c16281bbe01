mod card;
mod draw_limits;
mod draw_record;
mod draw_toggle;
mod user_id;
mod user_profile;

pub use card::{Card, CardId};
pub use draw_limits::{DrawDenied, DrawLimits};
pub use draw_record::DrawRecord;
pub use draw_toggle::DrawToggle;
pub use user_id::UserId;
pub use user_profile::UserProfile;
