use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use futures::{stream, StreamExt};

use crate::store::kv::KvStore;

use super::{entities::read_record, keys::date_key};

/// How many record lookups are kept in flight while scanning a window.
const FETCH_BUFFER: usize = 4;

/// Arithmetic means over the qualifying days of a window. Calories and protein are rounded to
/// the nearest whole unit, miles to one decimal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AverageSummary {
    pub calories: u32,
    pub protein: u32,
    pub miles: f64,
    pub days_counted: u32,
}

/// Computes means over the `window_days` calendar dates ending at `end` (inclusive). A day
/// qualifies only when its record sums to something positive; missing, corrupt, and all-zero
/// days stay out of both numerator and denominator, so an empty window yields zeroes instead of
/// a division by zero.
pub async fn compute_average(
    store: Arc<dyn KvStore>,
    end: NaiveDate,
    window_days: u32,
) -> AverageSummary {
    let mut records = stream::iter(window_dates(end, window_days))
        .map(|day| {
            let store = store.clone();
            async move { read_record(store.as_ref(), &date_key(day)).await }
        })
        .buffered(FETCH_BUFFER);

    let (mut calories, mut protein, mut miles) = (0.0, 0.0, 0.0);
    let mut days_counted = 0u32;
    while let Some(record) = records.next().await {
        let Some(record) = record else { continue };
        if !record.has_activity() {
            continue;
        }
        calories += record.calories;
        protein += record.protein;
        miles += record.miles;
        days_counted += 1;
    }

    if days_counted == 0 {
        return AverageSummary::default();
    }

    let days = f64::from(days_counted);
    AverageSummary {
        calories: (calories / days).round() as u32,
        protein: (protein / days).round() as u32,
        miles: (miles / days * 10.0).round() / 10.0,
        days_counted,
    }
}

/// Dates of the window, most recent first.
fn window_dates(end: NaiveDate, window_days: u32) -> Vec<NaiveDate> {
    (0..window_days)
        .map(|offset| end - Duration::days(i64::from(offset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::{compute_average, AverageSummary};
    use crate::store::{file::FileKvStore, kv::KvStore};

    fn june_30th() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn file_store(dir: &tempfile::TempDir) -> Arc<dyn KvStore> {
        Arc::new(FileKvStore::new(dir.path().to_path_buf()).unwrap())
    }

    #[tokio::test]
    async fn empty_store_averages_to_zero() {
        let dir = tempdir().unwrap();

        let summary = compute_average(file_store(&dir), june_30th(), 7).await;

        assert_eq!(summary, AverageSummary::default());
    }

    #[tokio::test]
    async fn only_qualifying_days_count_toward_the_denominator() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = file_store(&dir);
        store
            .set("stats-2024-06-30", r#"{"calories":100.0,"protein":10.0,"miles":1.0}"#)
            .await?;
        store
            .set("stats-2024-06-28", r#"{"calories":200.0,"protein":20.0,"miles":2.0}"#)
            .await?;
        store
            .set("stats-2024-06-26", r#"{"calories":300.0,"protein":30.0,"miles":3.0}"#)
            .await?;
        // An all-zero day is indistinguishable from a missing one.
        store
            .set("stats-2024-06-27", r#"{"calories":0.0,"protein":0.0,"miles":0.0}"#)
            .await?;

        let summary = compute_average(store, june_30th(), 7).await;

        assert_eq!(
            summary,
            AverageSummary {
                calories: 200,
                protein: 20,
                miles: 2.0,
                days_counted: 3,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn records_outside_the_window_are_ignored() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = file_store(&dir);
        store
            .set("stats-2024-06-30", r#"{"calories":100.0}"#)
            .await?;
        // 8 days before the window end, just past a 7 day window.
        store
            .set("stats-2024-06-22", r#"{"calories":900.0}"#)
            .await?;

        let summary = compute_average(store, june_30th(), 7).await;

        assert_eq!(summary.calories, 100);
        assert_eq!(summary.days_counted, 1);
        Ok(())
    }

    #[tokio::test]
    async fn calories_round_to_integers_and_miles_to_one_decimal() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = file_store(&dir);
        store
            .set("stats-2024-06-30", r#"{"calories":100.0,"protein":21.0,"miles":1.0}"#)
            .await?;
        store
            .set("stats-2024-06-29", r#"{"calories":101.0,"protein":22.0,"miles":2.5}"#)
            .await?;

        let summary = compute_average(store, june_30th(), 7).await;

        assert_eq!(summary.calories, 101);
        assert_eq!(summary.protein, 22);
        assert_eq!(summary.miles, 1.8);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_records_are_treated_as_absent() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = file_store(&dir);
        store
            .set("stats-2024-06-30", r#"{"calories":100.0}"#)
            .await?;
        store.set("stats-2024-06-29", "definitely not json").await?;

        let summary = compute_average(store, june_30th(), 7).await;

        assert_eq!(summary.calories, 100);
        assert_eq!(summary.days_counted, 1);
        Ok(())
    }
}
