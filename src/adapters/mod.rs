mod app_configs_repository_impl;
mod cards_repository_impl;
mod cloudinary_image_store;
mod data_url_image_store;
mod draw_records_repository_impl;
mod image_store_impl;
mod in_memory_draw_record_cache;
mod users_repository_impl;

pub use app_configs_repository_impl::*;
pub use cards_repository_impl::*;
pub use cloudinary_image_store::*;
pub use data_url_image_store::*;
pub use draw_records_repository_impl::*;
pub use image_store_impl::*;
pub use in_memory_draw_record_cache::*;
pub use users_repository_impl::*;
