mod admin;
mod cards;
mod draw;
mod users;

use std::collections::BTreeMap;

use actix_web::{error, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use ulid::Ulid;

use crate::entities::{Card, CardId, DrawRecord};

// Two base64 data URLs of up to 1.5 MB each, plus headroom for the rest of
// the upload body.
const JSON_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().limit(JSON_BODY_LIMIT))
            .service(
                web::resource("/cards")
                    .route(web::get().to(cards::list_cards))
                    .route(web::delete().to(cards::delete_all_cards)),
            )
            .service(web::resource("/cards/{id}").route(web::delete().to(cards::delete_card)))
            .service(web::resource("/upload").route(web::post().to(cards::upload)))
            .service(web::resource("/users").route(web::post().to(users::upsert_user)))
            .service(
                web::resource("/users/{user_id}/latest-card")
                    .route(web::get().to(users::latest_card)),
            )
            .service(web::resource("/draw").route(web::post().to(draw::draw)))
            .service(web::resource("/draw-records").route(web::delete().to(draw::clear_all)))
            .service(
                web::resource("/draw-records/{user_id}").route(web::get().to(draw::get_record)),
            )
            .service(web::resource("/admin/login").route(web::post().to(admin::login)))
            .service(
                web::resource("/admin/draw-toggle")
                    .route(web::get().to(admin::get_draw_toggle))
                    .route(web::post().to(admin::set_draw_toggle)),
            )
            .service(web::resource("/admin/users").route(web::get().to(admin::find_user)))
            .service(
                web::resource("/admin/draw-records/{user_id}")
                    .route(web::get().to(admin::get_user_record))
                    .route(web::delete().to(admin::clear_user_record)),
            )
            .service(
                web::resource("/admin/draw-records/{user_id}/remove-cards")
                    .route(web::post().to(admin::remove_cards)),
            ),
    );
}

/// Wire form of a card, camelCase like the rest of the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CardBody {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub position: String,
    pub front_image_url: String,
    pub back_image_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Card> for CardBody {
    fn from(card: Card) -> Self {
        Self {
            id: Ulid::from(card.id).to_string(),
            user_id: String::from(card.user_id),
            name: card.name,
            position: card.position,
            front_image_url: card.front_image_url,
            back_image_url: card.back_image_url,
            created_at: card.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DrawRecordBody {
    pub user_id: String,
    pub drawn_card_ids: Vec<String>,
    pub draw_count: u32,
    pub last_draw_time: i64,
    pub drawn_card_timestamps: BTreeMap<String, i64>,
    pub last_sync_time: i64,
}

impl From<DrawRecord> for DrawRecordBody {
    fn from(record: DrawRecord) -> Self {
        Self {
            user_id: String::from(record.user_id),
            drawn_card_ids: record
                .drawn_card_ids
                .iter()
                .map(|&id| Ulid::from(id).to_string())
                .collect(),
            draw_count: record.draw_count,
            last_draw_time: record.last_draw_time,
            drawn_card_timestamps: record
                .drawn_card_timestamps
                .iter()
                .map(|(&id, &at)| (Ulid::from(id).to_string(), at))
                .collect(),
            last_sync_time: record.last_sync_time,
        }
    }
}

pub(crate) fn fail_body(message: impl Into<String>) -> serde_json::Value {
    json!({ "success": false, "error": message.into() })
}

pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(fail_body("unauthorized"))
}

/// Unexpected store failures are logged server-side and surfaced as an
/// opaque 500; expected business failures never go through here.
pub(crate) fn internal_error(err: anyhow::Error) -> error::Error {
    log::error!("request failed: {err:#}");
    error::ErrorInternalServerError("internal error")
}

pub(crate) fn parse_card_id(raw: &str) -> Result<CardId, HttpResponse> {
    Ulid::from_string(raw)
        .map(CardId::from)
        .map_err(|_| HttpResponse::BadRequest().json(fail_body("invalid card id")))
}
