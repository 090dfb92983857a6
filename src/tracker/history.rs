use std::{future, sync::Arc};

use anyhow::Result;
use futures::{stream, StreamExt};
use tracing::warn;

use crate::store::kv::KvStore;

use super::{
    entities::{read_record, DayEntry},
    keys::{parse_date_key, STATS_KEY_PREFIX},
};

/// How many record lookups are kept in flight while collecting the listing.
const FETCH_BUFFER: usize = 8;

/// Lists every stored daily record, most recent first. The listing is best-effort: a record that
/// fails to parse is skipped with a warning instead of aborting the whole read, and keys outside
/// the canonical date format are ignored.
pub async fn list_all(store: Arc<dyn KvStore>) -> Result<Vec<DayEntry>> {
    let keys = store.list_keys().await?;

    let dated = keys.into_iter().filter_map(|key| match parse_date_key(&key) {
        Some(date) => Some((date, key)),
        None => {
            if key.starts_with(STATS_KEY_PREFIX) {
                warn!("Skipping record with unrecognized date key {key:?}");
            }
            None
        }
    });

    let mut entries = stream::iter(dated)
        .map(|(date, key)| {
            let store = store.clone();
            async move {
                read_record(store.as_ref(), &key)
                    .await
                    .map(|record| DayEntry { date, record })
            }
        })
        .buffered(FETCH_BUFFER)
        .filter_map(future::ready)
        .collect::<Vec<_>>()
        .await;

    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(entries)
}
