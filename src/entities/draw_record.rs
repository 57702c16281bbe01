use std::collections::{BTreeMap, BTreeSet};

use super::{CardId, UserId};

/// Per-user state of which cards have been drawn, and when.
///
/// One copy lives in the device-local cache and one in the remote store;
/// neither is authoritative on its own, the merge result is. Timestamps are
/// milliseconds since epoch, `0` meaning "never".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawRecord {
    pub user_id: UserId,
    pub drawn_card_ids: BTreeSet<CardId>,
    /// Incremented independently on each draw, NOT derived from the set size.
    /// The two can diverge when concurrently written records are merged
    /// (`draw_count` takes the max, the id sets take the union).
    pub draw_count: u32,
    pub last_draw_time: i64,
    pub drawn_card_timestamps: BTreeMap<CardId, i64>,
    pub last_sync_time: i64,
}

impl DrawRecord {
    pub fn empty(user_id: UserId, now_ms: i64) -> Self {
        Self {
            user_id,
            drawn_card_ids: BTreeSet::new(),
            draw_count: 0,
            last_draw_time: 0,
            drawn_card_timestamps: BTreeMap::new(),
            last_sync_time: now_ms,
        }
    }

    /// Reconciles the local and remote copies of a user's record.
    ///
    /// With both sides present: ids are unioned, timestamp maps are unioned
    /// with the local value winning on collision, and `draw_count` /
    /// `last_draw_time` each take the max of the two sides.
    pub fn merge(
        local: Option<DrawRecord>,
        remote: Option<DrawRecord>,
        user_id: &UserId,
        now_ms: i64,
    ) -> DrawRecord {
        match (local, remote) {
            (None, None) => DrawRecord::empty(user_id.clone(), now_ms),
            (Some(local), None) => local,
            (None, Some(remote)) => remote,
            (Some(local), Some(remote)) => {
                let mut drawn_card_ids = remote.drawn_card_ids;
                drawn_card_ids.extend(local.drawn_card_ids.iter().copied());

                let mut drawn_card_timestamps = remote.drawn_card_timestamps;
                drawn_card_timestamps.extend(local.drawn_card_timestamps.iter());

                DrawRecord {
                    user_id: user_id.clone(),
                    drawn_card_ids,
                    draw_count: local.draw_count.max(remote.draw_count),
                    last_draw_time: local.last_draw_time.max(remote.last_draw_time),
                    drawn_card_timestamps,
                    last_sync_time: now_ms,
                }
            }
        }
    }

    pub fn has_drawn(&self, card_id: CardId) -> bool {
        self.drawn_card_ids.contains(&card_id)
    }

    pub fn record_draw(&mut self, card_id: CardId, now_ms: i64) {
        self.drawn_card_ids.insert(card_id);
        self.draw_count += 1;
        self.last_draw_time = now_ms;
        self.drawn_card_timestamps.insert(card_id, now_ms);
        self.last_sync_time = now_ms;
    }

    /// Administrative removal of specific ids. The counter is decremented by
    /// the number of requested ids (floored at zero) even when some of them
    /// were not present, and `last_draw_time` is zeroed once the record
    /// empties out.
    pub fn remove_cards(&mut self, card_ids: &[CardId], now_ms: i64) {
        for card_id in card_ids {
            self.drawn_card_ids.remove(card_id);
            self.drawn_card_timestamps.remove(card_id);
        }
        self.draw_count = self.draw_count.saturating_sub(card_ids.len() as u32);
        if self.drawn_card_ids.is_empty() {
            self.last_draw_time = 0;
        }
        self.last_sync_time = now_ms;
    }

    /// Administrative reset to the zeroed state.
    pub fn clear(&mut self, now_ms: i64) {
        self.drawn_card_ids.clear();
        self.drawn_card_timestamps.clear();
        self.draw_count = 0;
        self.last_draw_time = 0;
        self.last_sync_time = now_ms;
    }
}
