use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::entities::{CardId, DrawRecord, UserId};
use crate::ports::{DrawRecordCache, DrawRecordsRepository, UsersRepository};

#[derive(Debug, Default)]
pub struct ClearAllOutcome {
    pub cleared: u64,
    pub errors: Vec<String>,
}

/// Resets every known user's record to the empty state. Per-user failures
/// are collected rather than aborting the sweep.
pub async fn clear_all_records<U, R>(
    users: &mut U,
    remote: &mut R,
    cache: &dyn DrawRecordCache,
    now: DateTime<Utc>,
) -> anyhow::Result<ClearAllOutcome>
where
    U: UsersRepository<Error = anyhow::Error> + Send,
    R: DrawRecordsRepository<Error = anyhow::Error> + Send,
{
    let now_ms = now.timestamp_millis();
    let user_ids = users.list_ids().await.context("list users")?;

    let mut outcome = ClearAllOutcome::default();
    for user_id in user_ids {
        match remote.clear(&user_id, now_ms).await {
            Ok(()) => {
                cache.remove(&user_id);
                outcome.cleared += 1;
            }
            Err(err) => {
                log::error!("clearing draw record for {} failed: {err:#}", user_id.as_str());
                outcome.errors.push(format!("{}: {err}", user_id.as_str()));
            }
        }
    }

    Ok(outcome)
}

pub async fn clear_user_record<R>(
    remote: &mut R,
    cache: &dyn DrawRecordCache,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> anyhow::Result<()>
where
    R: DrawRecordsRepository<Error = anyhow::Error> + Send,
{
    remote.clear(user_id, now.timestamp_millis()).await?;
    cache.remove(user_id);
    Ok(())
}

/// Filters the given ids out of a user's remote record. Returns `None` when
/// the user has no record. The cached copy is dropped so a stale local set
/// cannot union the removed ids straight back in on the next sync.
pub async fn remove_drawn_cards<R>(
    remote: &mut R,
    cache: &dyn DrawRecordCache,
    user_id: &UserId,
    card_ids: &[CardId],
    now: DateTime<Utc>,
) -> anyhow::Result<Option<DrawRecord>>
where
    R: DrawRecordsRepository<Error = anyhow::Error> + Send,
{
    let now_ms = now.timestamp_millis();

    let Some(mut record) = remote.load(user_id, now_ms).await? else {
        return Ok(None);
    };

    record.remove_cards(card_ids, now_ms);
    remote.save(&record).await?;
    cache.remove(user_id);

    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::adapters::InMemoryDrawRecordCache;
    use crate::entities::UserProfile;
    use crate::ports::DrawRecordCache;

    #[derive(Clone, Default)]
    struct FakeUsers {
        ids: Vec<String>,
    }

    #[async_trait]
    impl UsersRepository for FakeUsers {
        type Error = anyhow::Error;

        async fn save(&mut self, _profile: UserProfile) -> anyhow::Result<()> {
            Ok(())
        }

        async fn find_by_email(&mut self, _email: &str) -> anyhow::Result<Option<UserId>> {
            Ok(None)
        }

        async fn list_ids(&mut self) -> anyhow::Result<Vec<UserId>> {
            Ok(self
                .ids
                .iter()
                .map(|id| UserId::from(id.clone()))
                .collect())
        }
    }

    #[derive(Clone, Default)]
    struct FakeRemote {
        records: Arc<Mutex<HashMap<String, DrawRecord>>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl DrawRecordsRepository for FakeRemote {
        type Error = anyhow::Error;

        async fn load(
            &mut self,
            user_id: &UserId,
            _now_ms: i64,
        ) -> anyhow::Result<Option<DrawRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(user_id.as_str())
                .cloned())
        }

        async fn save(&mut self, record: &DrawRecord) -> anyhow::Result<()> {
            self.records
                .lock()
                .unwrap()
                .insert(record.user_id.as_str().to_string(), record.clone());
            Ok(())
        }

        async fn clear(&mut self, user_id: &UserId, now_ms: i64) -> anyhow::Result<()> {
            if self.fail_for.as_deref() == Some(user_id.as_str()) {
                return Err(anyhow!("permission denied"));
            }
            self.save(&DrawRecord::empty(user_id.clone(), now_ms)).await
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn drawn_record(user: &str, card_ids: &[CardId]) -> DrawRecord {
        let mut record = DrawRecord::empty(UserId::from(user.to_string()), 0);
        for (i, &id) in card_ids.iter().enumerate() {
            record.record_draw(id, 100 + i as i64);
        }
        record
    }

    #[tokio::test]
    async fn clear_all_collects_per_user_errors() {
        let mut users = FakeUsers {
            ids: vec!["alice".into(), "bob".into(), "carol".into()],
        };
        let mut remote = FakeRemote {
            fail_for: Some("bob".to_string()),
            ..Default::default()
        };
        let cache = InMemoryDrawRecordCache::new();

        let outcome = clear_all_records(&mut users, &mut remote, &cache, now())
            .await
            .unwrap();

        assert_eq!(outcome.cleared, 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("bob:"));
    }

    #[tokio::test]
    async fn clear_user_resets_remote_and_evicts_cache() {
        let uid = UserId::from("alice".to_string());
        let card = CardId::generate(now());
        let record = drawn_record("alice", &[card]);

        let mut remote = FakeRemote::default();
        remote.save(&record).await.unwrap();
        let cache = InMemoryDrawRecordCache::new();
        cache.save(&record);

        clear_user_record(&mut remote, &cache, &uid, now())
            .await
            .unwrap();

        let cleared = remote.load(&uid, 0).await.unwrap().unwrap();
        assert_eq!(cleared.draw_count, 0);
        assert!(cleared.drawn_card_ids.is_empty());
        assert!(cache.load(&uid).is_none());
    }

    #[tokio::test]
    async fn remove_drawn_cards_filters_and_saves() {
        let uid = UserId::from("alice".to_string());
        let keep = CardId::generate(now());
        let gone = CardId::generate(now());
        let record = drawn_record("alice", &[keep, gone]);

        let mut remote = FakeRemote::default();
        remote.save(&record).await.unwrap();
        let cache = InMemoryDrawRecordCache::new();
        cache.save(&record);

        let updated = remove_drawn_cards(&mut remote, &cache, &uid, &[gone], now())
            .await
            .unwrap()
            .unwrap();

        assert!(updated.has_drawn(keep));
        assert!(!updated.has_drawn(gone));
        assert_eq!(updated.draw_count, 1);
        assert!(cache.load(&uid).is_none());
        assert_eq!(
            remote.load(&uid, 0).await.unwrap().unwrap().draw_count,
            1
        );
    }

    #[tokio::test]
    async fn remove_drawn_cards_without_record_is_none() {
        let uid = UserId::from("alice".to_string());
        let mut remote = FakeRemote::default();
        let cache = InMemoryDrawRecordCache::new();

        let result = remove_drawn_cards(&mut remote, &cache, &uid, &[], now())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
