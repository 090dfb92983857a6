use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::kv::KvStore;

/// The struct stored as JSON under each daily key. Fields default to zero so records written by
/// older builds with missing fields still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DailyRecord {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub miles: f64,
}

impl DailyRecord {
    /// A day only counts toward averages when something was actually logged. An all-zero record
    /// is indistinguishable from a missing one.
    pub fn has_activity(&self) -> bool {
        self.calories + self.protein + self.miles > 0.0
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Calories => self.calories,
            Metric::Protein => self.protein,
            Metric::Miles => self.miles,
        }
    }

    pub fn value_mut(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::Calories => &mut self.calories,
            Metric::Protein => &mut self.protein,
            Metric::Miles => &mut self.miles,
        }
    }
}

/// The three counters a day is tracked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Calories,
    Protein,
    Miles,
}

/// A parsed daily record together with the date it was stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub record: DailyRecord,
}

/// Reads and parses a single daily record. Store failures and corrupted values are logged and
/// treated as absent data so one bad entry never takes a reader down.
pub async fn read_record(store: &dyn KvStore, key: &str) -> Option<DailyRecord> {
    let raw = match store.get(key).await {
        Ok(v) => v?,
        Err(e) => {
            warn!("Failed to read {key}: {e:?}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Found illegal json string under {key}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DailyRecord, Metric};

    #[test]
    fn missing_fields_default_to_zero() {
        let record: DailyRecord = serde_json::from_str(r#"{"calories":150}"#).unwrap();
        assert_eq!(record.calories, 150.0);
        assert_eq!(record.protein, 0.0);
        assert_eq!(record.miles, 0.0);
    }

    #[test]
    fn activity_requires_positive_sum() {
        assert!(!DailyRecord::default().has_activity());
        assert!(DailyRecord {
            miles: 0.5,
            ..Default::default()
        }
        .has_activity());
    }

    #[test]
    fn value_mut_addresses_the_right_counter() {
        let mut record = DailyRecord::default();
        *record.value_mut(Metric::Protein) = 25.0;
        assert_eq!(record.value(Metric::Protein), 25.0);
        assert_eq!(record.value(Metric::Calories), 0.0);
    }
}
