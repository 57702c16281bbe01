use crate::entities;

/// Device-local copy of draw records, keyed by user id so that more than one
/// account can be active on a device. Lookups never fail; absence is the only
/// miss mode.
pub trait DrawRecordCache {
    fn load(&self, user_id: &entities::UserId) -> Option<entities::DrawRecord>;

    fn save(&self, record: &entities::DrawRecord);

    fn remove(&self, user_id: &entities::UserId);
}
