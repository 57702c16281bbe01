use actix_web::{error, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{fail_body, internal_error, CardBody};
use crate::adapters::{CardsRepositoryImpl, UsersRepositoryImpl};
use crate::entities::{UserId, UserProfile};
use crate::ports::{CardsRepository, UsersRepository};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    user_id: String,
    email: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    photo_url: String,
}

pub async fn upsert_user(
    pool: web::Data<PgPool>,
    body: web::Json<UserBody>,
) -> Result<HttpResponse, error::Error> {
    let body = body.into_inner();
    if body.user_id.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(fail_body("userId is required")));
    }

    let mut users = UsersRepositoryImpl::new(pool.get_ref().clone());
    users
        .save(UserProfile {
            user_id: UserId::from(body.user_id),
            email: body.email,
            display_name: body.display_name,
            photo_url: body.photo_url,
            created_at: Utc::now(),
        })
        .await
        .map_err(internal_error)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub async fn latest_card(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, error::Error> {
    let user_id = UserId::from(path.into_inner());

    let mut cards = CardsRepositoryImpl::new(pool.get_ref().clone());
    let latest = cards
        .latest_by_user(&user_id)
        .await
        .map_err(internal_error)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "hasCard": latest.is_some(),
        "card": latest.map(CardBody::from),
    })))
}
