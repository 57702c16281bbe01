use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Acquire, Postgres, Row};

use crate::{entities, ports};

#[derive(Debug, Clone)]
pub struct UsersRepositoryImpl<A> {
    db: A,
}

impl<A> UsersRepositoryImpl<A> {
    pub fn new(db: A) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<A> ports::UsersRepository for UsersRepositoryImpl<A>
where
    A: Send,
    for<'c> &'c A: Acquire<'c, Database = Postgres>,
{
    type Error = anyhow::Error;

    async fn save(&mut self, profile: entities::UserProfile) -> Result<(), Self::Error> {
        let mut trx = self.db.begin().await?;

        sqlx::query(
            r#"
                INSERT INTO users (user_id, email, display_name, photo_url, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id) DO UPDATE SET
                    email = EXCLUDED.email,
                    display_name = EXCLUDED.display_name,
                    photo_url = EXCLUDED.photo_url
            "#,
        )
        .bind(profile.user_id.as_str())
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.photo_url)
        .bind(profile.created_at)
        .execute(&mut *trx)
        .await
        .context("upsert user profile")?;

        trx.commit().await?;
        Ok(())
    }

    async fn find_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<entities::UserId>, Self::Error> {
        let mut conn = self.db.acquire().await?;

        let row = sqlx::query("SELECT user_id FROM users WHERE email = $1 LIMIT 1")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
            .context("find user by email")?;

        Ok(row.map(|row| entities::UserId::from(row.get::<String, _>("user_id"))))
    }

    async fn list_ids(&mut self) -> Result<Vec<entities::UserId>, Self::Error> {
        let mut conn = self.db.acquire().await?;

        let rows = sqlx::query("SELECT user_id FROM users")
            .fetch_all(&mut *conn)
            .await
            .context("list user ids")?;

        Ok(rows
            .into_iter()
            .map(|row| entities::UserId::from(row.get::<String, _>("user_id")))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::ports::UsersRepository;

    fn profile(user_id: &entities::UserId, email: &str) -> entities::UserProfile {
        entities::UserProfile {
            user_id: user_id.clone(),
            email: email.to_string(),
            display_name: "Ada".to_string(),
            photo_url: String::new(),
            created_at: Utc::now(),
        }
    }

    #[sqlx::test]
    async fn test_users_repository(pool: sqlx::PgPool) {
        let mut repo = UsersRepositoryImpl::new(pool);
        let user_id = entities::UserId::from("test_user".to_string());

        assert!(repo.find_by_email("ada@example.com").await.unwrap().is_none());
        assert!(repo.list_ids().await.unwrap().is_empty());

        repo.save(profile(&user_id, "ada@example.com")).await.unwrap();
        assert_eq!(
            repo.find_by_email("ada@example.com").await.unwrap(),
            Some(user_id.clone())
        );

        repo.save(profile(&user_id, "lovelace@example.com")).await.unwrap();
        assert!(repo.find_by_email("ada@example.com").await.unwrap().is_none());
        assert_eq!(
            repo.find_by_email("lovelace@example.com").await.unwrap(),
            Some(user_id.clone())
        );
        assert_eq!(repo.list_ids().await.unwrap(), vec![user_id]);
    }
}
