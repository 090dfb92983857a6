use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    store::kv::KvStore,
    tracker::{
        entities::{read_record, DailyRecord, Metric},
        keys::{date_key, date_string, LAST_DATE_KEY},
    },
    utils::clock::Clock,
};

/// Quiet period between the last counter change and the write it triggers.
pub const FLUSH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Owns the in-memory counters for the current day. The tracker is the only writer for today's
/// key; aggregation and history reads never mutate the key space. Store failures are logged and
/// absorbed, leaving the in-memory counters authoritative until the next successful write.
pub struct TodayTracker {
    store: Arc<dyn KvStore>,
    clock: Box<dyn Clock>,
    today: NaiveDate,
    counters: Arc<Mutex<DailyRecord>>,
    pending: Option<PendingFlush>,
    debounce: Duration,
}

struct PendingFlush {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TodayTracker {
    pub fn new(store: Arc<dyn KvStore>, clock: Box<dyn Clock>) -> Self {
        let today = clock.today();
        Self {
            store,
            clock,
            today,
            counters: Arc::new(Mutex::new(DailyRecord::default())),
            pending: None,
            debounce: FLUSH_DEBOUNCE,
        }
    }

    /// Detects day rollover, hydrates counters from today's record, and moves the last-date
    /// marker forward. Rerunning on the same day is a no-op beyond the marker write.
    pub async fn init(&mut self) {
        self.today = self.clock.today();
        let today = date_string(self.today);
        let today_key = date_key(self.today);

        let last_date = match self.store.get(LAST_DATE_KEY).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to read the {LAST_DATE_KEY} marker: {e:?}");
                None
            }
        };

        if let Some(last) = last_date.filter(|last| *last != today) {
            // The previous day's record already lives under its own key, so there is nothing to
            // migrate. Only make sure today starts from a clean slate.
            info!("Rolling over from {last} to {today}");
            if let Err(e) = self.store.remove(&today_key).await {
                warn!("Failed to clear {today_key}: {e:?}");
            }
            *self.counters.lock().await = DailyRecord::default();
        }

        if let Some(stored) = read_record(self.store.as_ref(), &today_key).await {
            debug!("Hydrating counters from {today_key}");
            *self.counters.lock().await = stored;
        }

        if let Err(e) = self.store.set(LAST_DATE_KEY, &today).await {
            warn!("Failed to update the {LAST_DATE_KEY} marker: {e:?}");
        }
    }

    /// Applies a signed delta to one counter, clamping at zero. Non-finite deltas are ignored
    /// the same way unparseable input is.
    pub async fn adjust(&mut self, metric: Metric, delta: f64) {
        if !delta.is_finite() {
            debug!("Ignoring invalid {metric:?} delta");
            return;
        }
        {
            let mut counters = self.counters.lock().await;
            let value = counters.value_mut(metric);
            *value = (*value + delta).max(0.0);
        }
        self.schedule_flush();
    }

    /// At most one flush is pending at any moment, and it writes the counters as they stand when
    /// the quiet period ends. Intermediate states within the window are never persisted.
    fn schedule_flush(&mut self) {
        let previous = self.pending.take().map(|previous| {
            previous.cancel.cancel();
            previous.task
        });

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let store = self.store.clone();
        let counters = self.counters.clone();
        let key = date_key(self.today);
        let debounce = self.debounce;

        let task = tokio::spawn(async move {
            let fire = tokio::select! {
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(debounce) => true,
            };
            // A superseded flush past its timer may still be writing. Waiting it out keeps
            // store writes in schedule order, so the newest snapshot always lands last.
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            if fire {
                let snapshot = counters.lock().await.clone();
                write_record(store.as_ref(), &key, &snapshot).await;
            }
        });

        self.pending = Some(PendingFlush { cancel, task });
    }

    /// Writes the current counters immediately, superseding any scheduled flush. Called before a
    /// short-lived process exits so it doesn't have to sit out the quiet period.
    pub async fn flush(&mut self) {
        self.cancel_pending().await;
        let snapshot = self.counters.lock().await.clone();
        write_record(self.store.as_ref(), &date_key(self.today), &snapshot).await;
    }

    /// Zeroes the counters and deletes today's stored record. Confirmation is the caller's job.
    pub async fn reset(&mut self) {
        self.cancel_pending().await;
        *self.counters.lock().await = DailyRecord::default();
        let key = date_key(self.today);
        if let Err(e) = self.store.remove(&key).await {
            warn!("Failed to remove {key}: {e:?}");
        }
    }

    pub async fn snapshot(&self) -> DailyRecord {
        self.counters.lock().await.clone()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    async fn cancel_pending(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.cancel.cancel();
            // A flush past its timer may already be writing; wait it out so the writes that
            // follow can't be overtaken by it.
            let _ = previous.task.await;
        }
    }
}

async fn write_record(store: &dyn KvStore, key: &str, record: &DailyRecord) {
    let value = match serde_json::to_string(record) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to serialize record for {key}: {e}");
            return;
        }
    };
    if let Err(e) = store.set(key, &value).await {
        warn!("Failed to write {key}: {e:?}");
    }
}
