use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Acquire, Postgres};

use crate::{entities, ports};

const DRAW_TOGGLE_ID: &str = "draw";

#[derive(Debug, Clone, sqlx::FromRow)]
struct DrawToggleModel {
    enabled: bool,
    updated_at: Option<DateTime<Utc>>,
    updated_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfigsRepositoryImpl<A> {
    db: A,
}

impl<A> AppConfigsRepositoryImpl<A> {
    pub fn new(db: A) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<A> ports::AppConfigsRepository for AppConfigsRepositoryImpl<A>
where
    A: Send,
    for<'c> &'c A: Acquire<'c, Database = Postgres>,
{
    type Error = anyhow::Error;

    async fn get_draw_toggle(&mut self) -> Result<entities::DrawToggle, Self::Error> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, DrawToggleModel>(
            "SELECT enabled, updated_at, updated_by FROM app_configs WHERE id = $1",
        )
        .bind(DRAW_TOGGLE_ID)
        .fetch_optional(&mut *conn)
        .await
        .context("fetch draw toggle")?;

        Ok(model
            .map(|model| entities::DrawToggle {
                enabled: model.enabled,
                updated_at: model.updated_at,
                updated_by: model.updated_by,
            })
            .unwrap_or_else(entities::DrawToggle::default_enabled))
    }

    async fn set_draw_toggle(
        &mut self,
        enabled: bool,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<(), Self::Error> {
        let mut trx = self.db.begin().await?;

        sqlx::query(
            r#"
                INSERT INTO app_configs (id, enabled, updated_at, updated_by)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    enabled = EXCLUDED.enabled,
                    updated_at = EXCLUDED.updated_at,
                    updated_by = EXCLUDED.updated_by
            "#,
        )
        .bind(DRAW_TOGGLE_ID)
        .bind(enabled)
        .bind(now)
        .bind(updated_by)
        .execute(&mut *trx)
        .await
        .context("upsert draw toggle")?;

        trx.commit().await?;
        Ok(())
    }
}
