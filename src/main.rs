use actix_web::{middleware, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;

use conference_cards_backend::adapters::{ImageStoreImpl, InMemoryDrawRecordCache};
use conference_cards_backend::admin_session::AdminSession;
use conference_cards_backend::app_config::AppConfig;
use conference_cards_backend::handlers;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init();
    let config = AppConfig::from_env().map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let host = config.host.clone();
    let port = config.port;

    let pool = PgPoolOptions::new()
        .connect(&config.database_url)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let admin_session = AdminSession::new(&config.admin_password);
    let image_store = ImageStoreImpl::from_config(&config.image_store);
    let record_cache = web::Data::new(InMemoryDrawRecordCache::new());

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(admin_session.clone()))
            .app_data(web::Data::new(image_store.clone()))
            .app_data(record_cache.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
