use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Acquire, Postgres};
use ulid::Ulid;

use crate::{entities, ports};

#[derive(Debug, Clone, sqlx::FromRow)]
struct CardModel {
    id: String,
    user_id: String,
    name: String,
    position: String,
    front_image_url: String,
    back_image_url: String,
    created_at: DateTime<Utc>,
}

impl CardModel {
    fn into_entity(self) -> anyhow::Result<entities::Card> {
        let id = Ulid::from_str(&self.id).context("ulid decode error")?;

        Ok(entities::Card {
            id: entities::CardId::from(id),
            user_id: entities::UserId::from(self.user_id),
            name: self.name,
            position: self.position,
            front_image_url: self.front_image_url,
            back_image_url: self.back_image_url,
            created_at: self.created_at,
        })
    }
}

const CARD_COLUMNS: &str =
    "id, user_id, name, position, front_image_url, back_image_url, created_at";

#[derive(Debug, Clone)]
pub struct CardsRepositoryImpl<A> {
    db: A,
}

impl<A> CardsRepositoryImpl<A> {
    pub fn new(db: A) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<A> ports::CardsRepository for CardsRepositoryImpl<A>
where
    A: Send,
    for<'c> &'c A: Acquire<'c, Database = Postgres>,
{
    type Error = anyhow::Error;

    async fn create(&mut self, card: entities::Card) -> Result<entities::Card, Self::Error> {
        let mut trx = self.db.begin().await?;

        sqlx::query(
            r#"
                INSERT INTO cards (id, user_id, name, position, front_image_url, back_image_url, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Ulid::from(card.id).to_string())
        .bind(String::from(card.user_id.clone()))
        .bind(card.name.clone())
        .bind(card.position.clone())
        .bind(card.front_image_url.clone())
        .bind(card.back_image_url.clone())
        .bind(card.created_at)
        .execute(&mut *trx)
        .await
        .context("insert card")?;

        trx.commit().await?;
        Ok(card)
    }

    async fn list(
        &mut self,
        after_id: Option<entities::CardId>,
        limit: u32,
    ) -> Result<ports::PaginationResult<entities::Card>, Self::Error> {
        let mut conn = self.db.acquire().await?;

        let models = sqlx::query_as::<_, CardModel>(&format!(
            r#"
                SELECT {CARD_COLUMNS}
                FROM cards
                WHERE ($1::VARCHAR(26) IS NULL OR id < $1)
                ORDER BY id DESC
                LIMIT $2
            "#,
        ))
        .bind(after_id.map(|id| Ulid::from(id).to_string()))
        .bind(i64::from(limit) + 1)
        .fetch_all(&mut *conn)
        .await
        .context("fetch cards")?;

        let has_next = models.len() > limit as usize;
        let values = models
            .into_iter()
            .take(limit as usize)
            .map(|model| model.into_entity())
            .collect::<anyhow::Result<Vec<_>>>()
            .context("convert Card")?;

        Ok(ports::PaginationResult { values, has_next })
    }

    async fn list_all(&mut self) -> Result<Vec<entities::Card>, Self::Error> {
        let mut conn = self.db.acquire().await?;

        let models = sqlx::query_as::<_, CardModel>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards ORDER BY id DESC",
        ))
        .fetch_all(&mut *conn)
        .await
        .context("fetch cards")?;

        models
            .into_iter()
            .map(|model| model.into_entity())
            .collect::<anyhow::Result<Vec<_>>>()
            .context("convert Card")
    }

    async fn latest_by_user(
        &mut self,
        user_id: &entities::UserId,
    ) -> Result<Option<entities::Card>, Self::Error> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, CardModel>(&format!(
            r#"
                SELECT {CARD_COLUMNS}
                FROM cards
                WHERE user_id = $1
                ORDER BY id DESC
                LIMIT 1
            "#,
        ))
        .bind(user_id.as_str())
        .fetch_optional(&mut *conn)
        .await
        .context("fetch latest card")?;

        model.map(|model| model.into_entity()).transpose()
    }

    async fn user_has_card(&mut self, user_id: &entities::UserId) -> Result<bool, Self::Error> {
        let mut conn = self.db.acquire().await?;

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cards WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_one(&mut *conn)
                .await
                .context("count user cards")?;

        Ok(count > 0)
    }

    async fn count(&mut self) -> Result<u64, Self::Error> {
        let mut conn = self.db.acquire().await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cards")
            .fetch_one(&mut *conn)
            .await
            .context("count cards")?;

        Ok(count as u64)
    }

    async fn delete(&mut self, id: entities::CardId) -> Result<bool, Self::Error> {
        let mut trx = self.db.begin().await?;

        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(Ulid::from(id).to_string())
            .execute(&mut *trx)
            .await
            .context("delete card")?;

        trx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&mut self) -> Result<u64, Self::Error> {
        let mut trx = self.db.begin().await?;

        let result = sqlx::query("DELETE FROM cards")
            .execute(&mut *trx)
            .await
            .context("delete cards")?;

        trx.commit().await?;
        Ok(result.rows_affected())
    }
}
