use actix_web::http::StatusCode;
use actix_web::{error, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{fail_body, internal_error, parse_card_id, unauthorized, CardBody};
use crate::adapters::{CardsRepositoryImpl, ImageStoreImpl};
use crate::admin_session::AdminSession;
use crate::commands::cards_command::{self, NewCardInput, UploadError};
use crate::ports::CardsRepository;

const DEFAULT_PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    after: Option<String>,
    limit: Option<u32>,
}

pub async fn list_cards(
    pool: web::Data<PgPool>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, error::Error> {
    let after_id = match params.after.as_deref() {
        Some(raw) => match parse_card_id(raw) {
            Ok(id) => Some(id),
            Err(resp) => return Ok(resp),
        },
        None => None,
    };
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let mut cards = CardsRepositoryImpl::new(pool.get_ref().clone());
    let page = cards.list(after_id, limit).await.map_err(internal_error)?;
    let total = cards.count().await.map_err(internal_error)?;

    let bodies = page
        .values
        .into_iter()
        .map(CardBody::from)
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": bodies.len(),
        "totalCount": total,
        "totalPages": total.div_ceil(u64::from(limit)),
        "hasMore": page.has_next,
        "cards": bodies,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
    user_id: String,
    name: String,
    position: String,
    front_image: String,
    back_image: String,
}

pub async fn upload(
    pool: web::Data<PgPool>,
    images: web::Data<ImageStoreImpl>,
    body: web::Json<UploadBody>,
) -> Result<HttpResponse, error::Error> {
    let body = body.into_inner();
    let input = NewCardInput {
        user_id: body.user_id,
        name: body.name,
        position: body.position,
        front_image: body.front_image,
        back_image: body.back_image,
    };

    let mut cards = CardsRepositoryImpl::new(pool.get_ref().clone());
    match cards_command::create_card(&mut cards, images.get_ref(), input, Utc::now()).await {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "card": CardBody::from(card),
        }))),
        Err(UploadError::Internal(source)) => Err(internal_error(source)),
        Err(err) => {
            let status = match &err {
                UploadError::AlreadyUploaded => StatusCode::CONFLICT,
                UploadError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_REQUEST,
            };
            Ok(HttpResponse::build(status).json(fail_body(err.to_string())))
        }
    }
}

pub async fn delete_all_cards(
    pool: web::Data<PgPool>,
    admin: web::Data<AdminSession>,
    req: HttpRequest,
) -> Result<HttpResponse, error::Error> {
    if !admin.is_authorized(&req) {
        return Ok(unauthorized());
    }

    let mut cards = CardsRepositoryImpl::new(pool.get_ref().clone());
    let deleted = cards.delete_all().await.map_err(internal_error)?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "deletedCount": deleted,
    })))
}

pub async fn delete_card(
    pool: web::Data<PgPool>,
    admin: web::Data<AdminSession>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, error::Error> {
    if !admin.is_authorized(&req) {
        return Ok(unauthorized());
    }

    let id = match parse_card_id(&path) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let mut cards = CardsRepositoryImpl::new(pool.get_ref().clone());
    if cards.delete(id).await.map_err(internal_error)? {
        Ok(HttpResponse::Ok().json(json!({ "success": true })))
    } else {
        Ok(HttpResponse::NotFound().json(fail_body("card not found")))
    }
}
