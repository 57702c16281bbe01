use actix_web::{error, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{fail_body, internal_error, unauthorized, CardBody, DrawRecordBody};
use crate::adapters::{
    AppConfigsRepositoryImpl, CardsRepositoryImpl, DrawRecordsRepositoryImpl,
    InMemoryDrawRecordCache, UsersRepositoryImpl,
};
use crate::admin_session::AdminSession;
use crate::app_config::AppConfig;
use crate::commands::{draw_command, draw_records_admin_command};
use crate::entities::{DrawDenied, DrawToggle, UserId};
use crate::ports::{AppConfigsRepository, CardsRepository};

/// Returns the merged view of a user's record, running the usual sync
/// write-backs as a side effect.
pub async fn get_record(
    pool: web::Data<PgPool>,
    cache: web::Data<InMemoryDrawRecordCache>,
    path: web::Path<String>,
) -> Result<HttpResponse, error::Error> {
    let user_id = UserId::from(path.into_inner());

    let mut remote = DrawRecordsRepositoryImpl::new(pool.get_ref().clone());
    let record =
        draw_command::sync_record(&mut remote, cache.get_ref(), &user_id, Utc::now()).await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "record": DrawRecordBody::from(record),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawBody {
    user_id: String,
}

pub async fn draw(
    config: web::Data<AppConfig>,
    pool: web::Data<PgPool>,
    cache: web::Data<InMemoryDrawRecordCache>,
    body: web::Json<DrawBody>,
) -> Result<HttpResponse, error::Error> {
    let user_id = UserId::from(body.into_inner().user_id);
    let now = Utc::now();

    let mut app_configs = AppConfigsRepositoryImpl::new(pool.get_ref().clone());
    let toggle = match app_configs.get_draw_toggle().await {
        Ok(toggle) => toggle,
        Err(err) => {
            log::warn!("draw toggle read failed, assuming enabled: {err:#}");
            DrawToggle::default_enabled()
        }
    };
    if !toggle.enabled {
        return Ok(HttpResponse::Forbidden().json(fail_body("draw is currently disabled")));
    }

    let mut cards = CardsRepositoryImpl::new(pool.get_ref().clone());
    let catalog = cards.list_all().await.map_err(internal_error)?;

    let remote = DrawRecordsRepositoryImpl::new(pool.get_ref().clone());
    match draw_command::execute_draw(
        &catalog,
        remote,
        cache.get_ref(),
        &config.draw_limits,
        &user_id,
        now,
    )
    .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "card": CardBody::from(outcome.card),
            "record": DrawRecordBody::from(outcome.record),
        }))),
        // Denials are expected outcomes the client renders, not transport
        // errors, so they go out as 200 with success=false.
        Err(draw_command::DrawError::Denied(denied)) => {
            let mut body = fail_body(denied.to_string());
            if let DrawDenied::CooldownActive { remaining_ms } = denied {
                body["remainingCooldownMs"] = json!(remaining_ms);
            }
            Ok(HttpResponse::Ok().json(body))
        }
        Err(err @ draw_command::DrawError::NoCardsAvailable) => {
            Ok(HttpResponse::Ok().json(fail_body(err.to_string())))
        }
    }
}

pub async fn clear_all(
    pool: web::Data<PgPool>,
    cache: web::Data<InMemoryDrawRecordCache>,
    admin: web::Data<AdminSession>,
    req: HttpRequest,
) -> Result<HttpResponse, error::Error> {
    if !admin.is_authorized(&req) {
        return Ok(unauthorized());
    }

    let mut users = UsersRepositoryImpl::new(pool.get_ref().clone());
    let mut remote = DrawRecordsRepositoryImpl::new(pool.get_ref().clone());
    let outcome = draw_records_admin_command::clear_all_records(
        &mut users,
        &mut remote,
        cache.get_ref(),
        Utc::now(),
    )
    .await
    .map_err(internal_error)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": outcome.errors.is_empty(),
        "deletedCount": outcome.cleared,
        "errors": outcome.errors,
    })))
}
