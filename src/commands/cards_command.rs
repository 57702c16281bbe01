use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use thiserror::Error;
use ulid::Ulid;

use crate::entities::{Card, CardId, UserId};
use crate::ports::{CardsRepository, ImageStore};

/// Uploads are bounded at 1.5 MB per image.
pub const MAX_IMAGE_BYTES: usize = 1_572_864;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("name, position and user id are required")]
    MissingFields,
    #[error("front and back images are required")]
    MissingImages,
    #[error("uploaded files must be images")]
    NotAnImage,
    #[error("images must be at most {max_bytes} bytes")]
    ImageTooLarge { max_bytes: usize },
    #[error("invalid image data")]
    InvalidImageData,
    #[error("this account has already uploaded a card")]
    AlreadyUploaded,
    #[error("cannot verify upload state right now, try again later")]
    StoreUnavailable(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct NewCardInput {
    pub user_id: String,
    pub name: String,
    pub position: String,
    /// Both images arrive as `data:<type>;base64,<payload>` strings.
    pub front_image: String,
    pub back_image: String,
}

fn decode_data_url(data_url: &str) -> Result<(Vec<u8>, String), UploadError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(UploadError::InvalidImageData)?;
    let (content_type, payload) = rest
        .split_once(";base64,")
        .ok_or(UploadError::InvalidImageData)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| UploadError::InvalidImageData)?;
    Ok((bytes, content_type.to_string()))
}

/// Validates and stores a new card: required fields, image type, size cap,
/// and the one-card-per-account rule. When the store cannot confirm whether
/// the account already has a card, the upload is refused rather than letting
/// it bypass the limit.
pub async fn create_card<C>(
    cards: &mut C,
    images: &dyn ImageStore,
    input: NewCardInput,
    now: DateTime<Utc>,
) -> Result<Card, UploadError>
where
    C: CardsRepository<Error = anyhow::Error> + Send,
{
    let name = input.name.trim();
    let position = input.position.trim();
    let user_id = input.user_id.trim();
    if name.is_empty() || position.is_empty() || user_id.is_empty() {
        return Err(UploadError::MissingFields);
    }
    if input.front_image.is_empty() || input.back_image.is_empty() {
        return Err(UploadError::MissingImages);
    }

    let (front_bytes, front_type) = decode_data_url(&input.front_image)?;
    let (back_bytes, back_type) = decode_data_url(&input.back_image)?;

    if !front_type.starts_with("image/") || !back_type.starts_with("image/") {
        return Err(UploadError::NotAnImage);
    }
    if front_bytes.len() > MAX_IMAGE_BYTES || back_bytes.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::ImageTooLarge {
            max_bytes: MAX_IMAGE_BYTES,
        });
    }

    let user_id = UserId::from(user_id.to_string());
    match cards.user_has_card(&user_id).await {
        Ok(true) => return Err(UploadError::AlreadyUploaded),
        Ok(false) => {}
        Err(err) => return Err(UploadError::StoreUnavailable(err)),
    }

    let id = CardId::generate(now);
    let id_str = Ulid::from(id).to_string();

    let front_image_url = images
        .upload(&front_bytes, &front_type, &format!("cards/{id_str}_front"))
        .await?;
    let back_image_url = images
        .upload(&back_bytes, &back_type, &format!("cards/{id_str}_back"))
        .await?;

    let card = Card {
        id,
        user_id,
        name: name.to_string(),
        position: position.to_string(),
        front_image_url,
        back_image_url,
        created_at: now,
    };

    Ok(cards.create(card).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::adapters::DataUrlImageStore;
    use crate::ports::PaginationResult;

    #[derive(Clone, Default)]
    struct FakeCards {
        cards: Arc<Mutex<Vec<Card>>>,
        fail: bool,
    }

    #[async_trait]
    impl CardsRepository for FakeCards {
        type Error = anyhow::Error;

        async fn create(&mut self, card: Card) -> anyhow::Result<Card> {
            self.cards.lock().unwrap().push(card.clone());
            Ok(card)
        }

        async fn list(
            &mut self,
            _after_id: Option<CardId>,
            _limit: u32,
        ) -> anyhow::Result<PaginationResult<Card>> {
            Ok(PaginationResult {
                values: self.cards.lock().unwrap().clone(),
                has_next: false,
            })
        }

        async fn list_all(&mut self) -> anyhow::Result<Vec<Card>> {
            Ok(self.cards.lock().unwrap().clone())
        }

        async fn latest_by_user(&mut self, user_id: &UserId) -> anyhow::Result<Option<Card>> {
            Ok(self
                .cards
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|card| card.user_id == *user_id)
                .cloned())
        }

        async fn user_has_card(&mut self, user_id: &UserId) -> anyhow::Result<bool> {
            if self.fail {
                return Err(anyhow!("store unavailable"));
            }
            Ok(self
                .cards
                .lock()
                .unwrap()
                .iter()
                .any(|card| card.user_id == *user_id))
        }

        async fn count(&mut self) -> anyhow::Result<u64> {
            Ok(self.cards.lock().unwrap().len() as u64)
        }

        async fn delete(&mut self, id: CardId) -> anyhow::Result<bool> {
            let mut cards = self.cards.lock().unwrap();
            let before = cards.len();
            cards.retain(|card| card.id != id);
            Ok(cards.len() < before)
        }

        async fn delete_all(&mut self) -> anyhow::Result<u64> {
            let mut cards = self.cards.lock().unwrap();
            let count = cards.len() as u64;
            cards.clear();
            Ok(count)
        }
    }

    fn png_data_url(len: usize) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(vec![0u8; len]))
    }

    fn input(user_id: &str) -> NewCardInput {
        NewCardInput {
            user_id: user_id.to_string(),
            name: "Ada Lovelace".to_string(),
            position: "Engineer".to_string(),
            front_image: png_data_url(16),
            back_image: png_data_url(16),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    #[tokio::test]
    async fn stores_card_with_uploaded_image_urls() {
        let mut cards = FakeCards::default();
        let card = create_card(&mut cards, &DataUrlImageStore, input("alice"), now())
            .await
            .unwrap();

        assert_eq!(card.name, "Ada Lovelace");
        assert!(card.front_image_url.starts_with("data:image/png;base64,"));
        assert_eq!(cards.cards.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_blank_fields() {
        let mut cards = FakeCards::default();
        let mut bad = input("alice");
        bad.name = "   ".to_string();

        let result = create_card(&mut cards, &DataUrlImageStore, bad, now()).await;
        assert!(matches!(result, Err(UploadError::MissingFields)));
        assert!(cards.cards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_non_image_payloads() {
        let mut cards = FakeCards::default();
        let mut bad = input("alice");
        bad.front_image = format!("data:text/plain;base64,{}", STANDARD.encode("hi"));

        let result = create_card(&mut cards, &DataUrlImageStore, bad, now()).await;
        assert!(matches!(result, Err(UploadError::NotAnImage)));
    }

    #[tokio::test]
    async fn rejects_oversized_images() {
        let mut cards = FakeCards::default();
        let mut bad = input("alice");
        bad.back_image = png_data_url(MAX_IMAGE_BYTES + 1);

        let result = create_card(&mut cards, &DataUrlImageStore, bad, now()).await;
        assert!(matches!(result, Err(UploadError::ImageTooLarge { .. })));
    }

    #[tokio::test]
    async fn rejects_undecodable_images() {
        let mut cards = FakeCards::default();
        let mut bad = input("alice");
        bad.front_image = "data:image/png;base64,@@@".to_string();

        let result = create_card(&mut cards, &DataUrlImageStore, bad, now()).await;
        assert!(matches!(result, Err(UploadError::InvalidImageData)));
    }

    #[tokio::test]
    async fn enforces_one_card_per_account() {
        let mut cards = FakeCards::default();
        create_card(&mut cards, &DataUrlImageStore, input("alice"), now())
            .await
            .unwrap();

        let result = create_card(&mut cards, &DataUrlImageStore, input("alice"), now()).await;
        assert!(matches!(result, Err(UploadError::AlreadyUploaded)));
    }

    #[tokio::test]
    async fn refuses_upload_when_duplicate_check_unavailable() {
        let mut cards = FakeCards {
            fail: true,
            ..Default::default()
        };

        let result = create_card(&mut cards, &DataUrlImageStore, input("alice"), now()).await;
        assert!(matches!(result, Err(UploadError::StoreUnavailable(_))));
        assert!(cards.cards.lock().unwrap().is_empty());
    }
}
