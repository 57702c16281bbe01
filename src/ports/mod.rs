mod app_configs_repository;
mod cards_repository;
mod common;
mod draw_record_cache;
mod draw_records_repository;
mod image_store;
mod users_repository;

pub use app_configs_repository::*;
pub use cards_repository::*;
pub use common::*;
pub use draw_record_cache::*;
pub use draw_records_repository::*;
pub use image_store::*;
pub use users_repository::*;
