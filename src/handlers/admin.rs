use actix_web::{error, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{fail_body, internal_error, parse_card_id, unauthorized, DrawRecordBody};
use crate::adapters::{
    AppConfigsRepositoryImpl, DrawRecordsRepositoryImpl, InMemoryDrawRecordCache,
    UsersRepositoryImpl,
};
use crate::admin_session::AdminSession;
use crate::commands::draw_records_admin_command;
use crate::entities::{DrawToggle, UserId};
use crate::ports::{AppConfigsRepository, DrawRecordsRepository, UsersRepository};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    password: String,
}

pub async fn login(
    admin: web::Data<AdminSession>,
    body: web::Json<LoginBody>,
) -> Result<HttpResponse, error::Error> {
    if admin.verify(&body.password) {
        Ok(HttpResponse::Ok()
            .cookie(admin.issue_cookie())
            .json(json!({ "success": true })))
    } else {
        Ok(HttpResponse::Unauthorized().json(fail_body("invalid password")))
    }
}

/// Public read so the client can hide the draw button. When the store cannot
/// be reached the toggle is reported as enabled rather than locking everyone
/// out.
pub async fn get_draw_toggle(pool: web::Data<PgPool>) -> Result<HttpResponse, error::Error> {
    let mut app_configs = AppConfigsRepositoryImpl::new(pool.get_ref().clone());
    let toggle = match app_configs.get_draw_toggle().await {
        Ok(toggle) => toggle,
        Err(err) => {
            log::warn!("draw toggle read failed, reporting enabled: {err:#}");
            DrawToggle::default_enabled()
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "enabled": toggle.enabled,
        "updatedAt": toggle.updated_at,
        "updatedBy": toggle.updated_by,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    enabled: bool,
}

pub async fn set_draw_toggle(
    pool: web::Data<PgPool>,
    admin: web::Data<AdminSession>,
    req: HttpRequest,
    body: web::Json<ToggleBody>,
) -> Result<HttpResponse, error::Error> {
    if !admin.is_authorized(&req) {
        return Ok(unauthorized());
    }

    let mut app_configs = AppConfigsRepositoryImpl::new(pool.get_ref().clone());
    app_configs
        .set_draw_toggle(body.enabled, "admin", Utc::now())
        .await
        .map_err(internal_error)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "enabled": body.enabled,
    })))
}

#[derive(Debug, Deserialize)]
pub struct FindUserParams {
    email: String,
}

pub async fn find_user(
    pool: web::Data<PgPool>,
    admin: web::Data<AdminSession>,
    req: HttpRequest,
    params: web::Query<FindUserParams>,
) -> Result<HttpResponse, error::Error> {
    if !admin.is_authorized(&req) {
        return Ok(unauthorized());
    }

    let mut users = UsersRepositoryImpl::new(pool.get_ref().clone());
    match users
        .find_by_email(&params.email)
        .await
        .map_err(internal_error)?
    {
        Some(user_id) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "userId": user_id.as_str(),
        }))),
        None => Ok(HttpResponse::NotFound().json(fail_body("user not found"))),
    }
}

pub async fn get_user_record(
    pool: web::Data<PgPool>,
    admin: web::Data<AdminSession>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, error::Error> {
    if !admin.is_authorized(&req) {
        return Ok(unauthorized());
    }

    let user_id = UserId::from(path.into_inner());
    let now_ms = Utc::now().timestamp_millis();

    let mut remote = DrawRecordsRepositoryImpl::new(pool.get_ref().clone());
    match remote.load(&user_id, now_ms).await.map_err(internal_error)? {
        Some(record) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "record": DrawRecordBody::from(record),
        }))),
        None => Ok(HttpResponse::NotFound().json(fail_body("no draw record"))),
    }
}

pub async fn clear_user_record(
    pool: web::Data<PgPool>,
    cache: web::Data<InMemoryDrawRecordCache>,
    admin: web::Data<AdminSession>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, error::Error> {
    if !admin.is_authorized(&req) {
        return Ok(unauthorized());
    }

    let user_id = UserId::from(path.into_inner());
    let mut remote = DrawRecordsRepositoryImpl::new(pool.get_ref().clone());
    draw_records_admin_command::clear_user_record(
        &mut remote,
        cache.get_ref(),
        &user_id,
        Utc::now(),
    )
    .await
    .map_err(internal_error)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCardsBody {
    card_ids: Vec<String>,
}

pub async fn remove_cards(
    pool: web::Data<PgPool>,
    cache: web::Data<InMemoryDrawRecordCache>,
    admin: web::Data<AdminSession>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<RemoveCardsBody>,
) -> Result<HttpResponse, error::Error> {
    if !admin.is_authorized(&req) {
        return Ok(unauthorized());
    }

    let user_id = UserId::from(path.into_inner());
    let mut card_ids = Vec::with_capacity(body.card_ids.len());
    for raw in &body.card_ids {
        match parse_card_id(raw) {
            Ok(id) => card_ids.push(id),
            Err(resp) => return Ok(resp),
        }
    }

    let mut remote = DrawRecordsRepositoryImpl::new(pool.get_ref().clone());
    match draw_records_admin_command::remove_drawn_cards(
        &mut remote,
        cache.get_ref(),
        &user_id,
        &card_ids,
        Utc::now(),
    )
    .await
    .map_err(internal_error)?
    {
        Some(record) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "record": DrawRecordBody::from(record),
        }))),
        None => Ok(HttpResponse::NotFound().json(fail_body("no draw record"))),
    }
}
