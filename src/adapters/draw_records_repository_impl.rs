use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use sqlx::{Acquire, Postgres};
use ulid::Ulid;

use crate::{entities, ports};

#[derive(Debug, Clone, sqlx::FromRow)]
struct DrawRecordModel {
    user_id: String,
    drawn_card_ids: Vec<String>,
    draw_count: i32,
    last_draw_time: i64,
    drawn_card_timestamps: serde_json::Value,
}

impl DrawRecordModel {
    fn into_entity(self, now_ms: i64) -> anyhow::Result<entities::DrawRecord> {
        let drawn_card_ids = self
            .drawn_card_ids
            .iter()
            .map(|id| {
                Ulid::from_str(id)
                    .map(entities::CardId::from)
                    .context("ulid decode error")
            })
            .collect::<anyhow::Result<BTreeSet<_>>>()?;

        let drawn_card_timestamps = self
            .drawn_card_timestamps
            .as_object()
            .ok_or_else(|| anyhow!("drawn_card_timestamps must be an object"))?
            .iter()
            .map(|(id, at)| {
                let id = Ulid::from_str(id)
                    .map(entities::CardId::from)
                    .context("ulid decode error")?;
                let at = at
                    .as_i64()
                    .ok_or_else(|| anyhow!("draw timestamp must be an integer"))?;
                Ok((id, at))
            })
            .collect::<anyhow::Result<BTreeMap<_, _>>>()?;

        Ok(entities::DrawRecord {
            user_id: entities::UserId::from(self.user_id),
            drawn_card_ids,
            draw_count: u32::try_from(self.draw_count).context("draw_count negative")?,
            last_draw_time: self.last_draw_time,
            drawn_card_timestamps,
            // Mirrors what a freshly synced copy would carry.
            last_sync_time: now_ms,
        })
    }
}

fn timestamps_json(record: &entities::DrawRecord) -> serde_json::Value {
    record
        .drawn_card_timestamps
        .iter()
        .map(|(id, at)| (Ulid::from(*id).to_string(), serde_json::json!(at)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

#[derive(Debug, Clone)]
pub struct DrawRecordsRepositoryImpl<A> {
    db: A,
}

impl<A> DrawRecordsRepositoryImpl<A> {
    pub fn new(db: A) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<A> ports::DrawRecordsRepository for DrawRecordsRepositoryImpl<A>
where
    A: Send,
    for<'c> &'c A: Acquire<'c, Database = Postgres>,
{
    type Error = anyhow::Error;

    async fn load(
        &mut self,
        user_id: &entities::UserId,
        now_ms: i64,
    ) -> Result<Option<entities::DrawRecord>, Self::Error> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, DrawRecordModel>(
            r#"
                SELECT user_id, drawn_card_ids, draw_count, last_draw_time, drawn_card_timestamps
                FROM draw_records
                WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&mut *conn)
        .await
        .context("fetch draw record")?;

        model
            .map(|model| model.into_entity(now_ms))
            .transpose()
            .context("convert DrawRecord")
    }

    async fn save(&mut self, record: &entities::DrawRecord) -> Result<(), Self::Error> {
        let mut trx = self.db.begin().await?;

        let ids = record
            .drawn_card_ids
            .iter()
            .map(|&id| Ulid::from(id).to_string())
            .collect::<Vec<_>>();

        sqlx::query(
            r#"
                INSERT INTO draw_records
                    (user_id, drawn_card_ids, draw_count, last_draw_time, drawn_card_timestamps, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (user_id) DO UPDATE SET
                    drawn_card_ids = EXCLUDED.drawn_card_ids,
                    draw_count = EXCLUDED.draw_count,
                    last_draw_time = EXCLUDED.last_draw_time,
                    drawn_card_timestamps = EXCLUDED.drawn_card_timestamps,
                    updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.user_id.as_str())
        .bind(&ids)
        .bind(i32::try_from(record.draw_count).context("draw_count overflow")?)
        .bind(record.last_draw_time)
        .bind(timestamps_json(record))
        .bind(record.last_sync_time)
        .execute(&mut *trx)
        .await
        .context("upsert draw record")?;

        trx.commit().await?;
        Ok(())
    }

    async fn clear(
        &mut self,
        user_id: &entities::UserId,
        now_ms: i64,
    ) -> Result<(), Self::Error> {
        let empty = entities::DrawRecord::empty(user_id.clone(), now_ms);
        self.save(&empty).await.context("clear draw record")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::ports::DrawRecordsRepository;

    #[sqlx::test]
    async fn test_draw_records_repository(pool: sqlx::PgPool) {
        let mut repo = DrawRecordsRepositoryImpl::new(pool);
        let user_id = entities::UserId::from("test_user".to_string());

        assert!(repo.load(&user_id, 0).await.unwrap().is_none());

        let a = entities::CardId::generate(Utc::now());
        let b = entities::CardId::generate(Utc::now());
        let mut record = entities::DrawRecord::empty(user_id.clone(), 1_000);
        record.record_draw(a, 1_100);
        record.record_draw(b, 1_200);
        repo.save(&record).await.unwrap();

        let loaded = repo.load(&user_id, 2_000).await.unwrap().unwrap();
        assert_eq!(loaded.drawn_card_ids, record.drawn_card_ids);
        assert_eq!(loaded.drawn_card_timestamps, record.drawn_card_timestamps);
        assert_eq!(loaded.draw_count, 2);
        assert_eq!(loaded.last_draw_time, 1_200);
        assert_eq!(loaded.last_sync_time, 2_000);

        record.remove_cards(&[a], 1_300);
        repo.save(&record).await.unwrap();
        let overwritten = repo.load(&user_id, 3_000).await.unwrap().unwrap();
        assert_eq!(overwritten.draw_count, 1);
        assert!(!overwritten.has_drawn(a));
        assert!(overwritten.has_drawn(b));

        repo.clear(&user_id, 4_000).await.unwrap();
        let cleared = repo.load(&user_id, 5_000).await.unwrap().unwrap();
        assert_eq!(cleared.draw_count, 0);
        assert!(cleared.drawn_card_ids.is_empty());
        assert!(cleared.drawn_card_timestamps.is_empty());
        assert_eq!(cleared.last_draw_time, 0);
    }
}
