use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use crate::entities::{Card, DrawDenied, DrawLimits, DrawRecord, UserId};
use crate::ports::{DrawRecordCache, DrawRecordsRepository};

#[derive(Error, Debug)]
pub enum DrawError {
    #[error("no cards available")]
    NoCardsAvailable,
    #[error(transparent)]
    Denied(#[from] DrawDenied),
}

#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub card: Card,
    pub record: DrawRecord,
}

/// Reconciles the local and remote copies of a user's record at session
/// start.
///
/// The merge result goes to the local cache unconditionally, and to the
/// remote store only when the remote copy was absent or differs in id-set
/// cardinality or draw count (cheap change detection, not a full diff).
/// Store failures on either side are logged and recovered by treating that
/// side as absent; this function itself never fails.
pub async fn sync_record<R>(
    remote: &mut R,
    cache: &dyn DrawRecordCache,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> DrawRecord
where
    R: DrawRecordsRepository<Error = anyhow::Error> + Send,
{
    let now_ms = now.timestamp_millis();

    let local = cache.load(user_id);
    let remote_record = match remote.load(user_id, now_ms).await {
        Ok(record) => record,
        Err(err) => {
            log::warn!(
                "remote draw record load failed for {}: {err:#}",
                user_id.as_str()
            );
            None
        }
    };

    let remote_stats = remote_record
        .as_ref()
        .map(|record| (record.drawn_card_ids.len(), record.draw_count));

    let merged = DrawRecord::merge(local, remote_record, user_id, now_ms);
    cache.save(&merged);

    let changed = match remote_stats {
        None => true,
        Some((len, count)) => merged.drawn_card_ids.len() != len || merged.draw_count != count,
    };
    if changed {
        if let Err(err) = remote.save(&merged).await {
            log::warn!(
                "remote draw record write-back failed for {}: {err:#}",
                user_id.as_str()
            );
        }
    }

    merged
}

/// Draws one card for the user from the catalog.
///
/// The eligible set excludes the user's own cards and anything already in
/// the record; emptiness is checked before the per-user limits so "nothing
/// left to draw" wins over "you are capped". On success the updated record
/// is written to the local cache synchronously and pushed to the remote
/// store from a background task whose failure is logged only. Every failure
/// path leaves both stores untouched.
pub async fn execute_draw<R>(
    catalog: &[Card],
    mut remote: R,
    cache: &dyn DrawRecordCache,
    limits: &DrawLimits,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> Result<DrawOutcome, DrawError>
where
    R: DrawRecordsRepository<Error = anyhow::Error> + Send + 'static,
{
    let now_ms = now.timestamp_millis();

    let mut record = sync_record(&mut remote, cache, user_id, now).await;

    let eligible = catalog
        .iter()
        .filter(|card| card.user_id != *user_id && !record.has_drawn(card.id))
        .collect::<Vec<_>>();

    if eligible.is_empty() {
        return Err(DrawError::NoCardsAvailable);
    }

    limits.can_draw(&record, now_ms)?;

    let chosen = eligible[rand::rng().random_range(0..eligible.len())].clone();

    record.record_draw(chosen.id, now_ms);
    cache.save(&record);

    let pushed = record.clone();
    tokio::spawn(async move {
        if let Err(err) = remote.save(&pushed).await {
            log::warn!(
                "background draw record sync failed for {}: {err:#}",
                pushed.user_id.as_str()
            );
        }
    });

    Ok(DrawOutcome {
        card: chosen,
        record,
    })
}
