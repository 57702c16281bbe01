use anyhow::{anyhow, Context};
use std::env;

use crate::entities::DrawLimits;

#[derive(Debug, Clone)]
pub enum ImageStoreConfig {
    Cloudinary {
        cloud_name: String,
        upload_preset: String,
    },
    DataUrl,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub admin_password: String,
    pub draw_limits: DrawLimits,
    pub image_store: ImageStoreConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<AppConfig> {
        let host = env::var("HOST").unwrap_or_else(|_| "localhost".to_owned());
        let port = env::var("PORT")
            .map(|x| x.parse::<u16>())
            .unwrap_or(Ok(8080))
            .context("PORT")?;
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL")?;
        let admin_password = env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD")?;

        let draw_limits = DrawLimits {
            max_draws: env::var("MAX_DRAWS")
                .map(|x| x.parse::<u32>())
                .unwrap_or(Ok(DrawLimits::default().max_draws))
                .context("MAX_DRAWS")?,
            cooldown_ms: env::var("COOLDOWN_MS")
                .map(|x| x.parse::<i64>())
                .unwrap_or(Ok(DrawLimits::default().cooldown_ms))
                .context("COOLDOWN_MS")?,
        };

        let image_store = match env::var("IMAGE_STORE_KIND")
            .unwrap_or_else(|_| "DATA_URL".to_owned())
            .as_str()
        {
            "CLOUDINARY" => ImageStoreConfig::Cloudinary {
                cloud_name: env::var("CLOUDINARY_CLOUD_NAME").context("CLOUDINARY_CLOUD_NAME")?,
                upload_preset: env::var("CLOUDINARY_UPLOAD_PRESET")
                    .context("CLOUDINARY_UPLOAD_PRESET")?,
            },
            "DATA_URL" => ImageStoreConfig::DataUrl,
            _ => Err(anyhow!("Invalid image store kind"))?,
        };

        Ok(AppConfig {
            host,
            port,
            database_url,
            admin_password,
            draw_limits,
            image_store,
        })
    }
}
