use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use clap::Subcommand;

use crate::{
    store::kv::KvStore,
    tracker::{entities::DailyRecord, keys::date_key},
    utils::clock::{Clock, DefaultClock},
};

use super::confirm;

#[derive(Subcommand, Debug)]
pub enum DebugCommand {
    #[command(about = "Print every key and raw value in the store")]
    Dump,
    #[command(about = "Delete a single key")]
    Delete {
        key: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Copy a daily record onto an earlier date")]
    Duplicate {
        key: String,
        #[arg(
            long,
            default_value_t = 1,
            help = "How many days before today the copy lands on"
        )]
        days_back: u32,
    },
    #[command(about = "Delete every key in the store")]
    ClearAll {
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

/// Command to process `debug` subcommands. These operate on the raw key space, bypassing the
/// tracker, and exist for poking at the store during development.
pub async fn process_debug_command(store: Arc<dyn KvStore>, command: DebugCommand) -> Result<()> {
    match command {
        DebugCommand::Dump => {
            let mut keys = store.list_keys().await?;
            keys.sort();
            for key in keys {
                if let Some(value) = store.get(&key).await? {
                    println!("{key}\t{value}");
                }
            }
        }
        DebugCommand::Delete { key, yes } => {
            if !confirm(&format!("Delete {key:?}?"), yes)? {
                println!("Aborted");
                return Ok(());
            }
            store.remove(&key).await?;
            println!("Deleted {key}");
        }
        DebugCommand::Duplicate { key, days_back } => {
            let Some(value) = store.get(&key).await? else {
                bail!("no value stored under {key:?}");
            };
            // Round-tripping through the record type normalizes legacy values onto the
            // canonical shape before they land under a canonical key.
            let record: DailyRecord = serde_json::from_str(&value)
                .with_context(|| format!("value under {key:?} is not a daily record"))?;

            let target = DefaultClock.today() - Duration::days(i64::from(days_back));
            let new_key = date_key(target);
            store.set(&new_key, &serde_json::to_string(&record)?).await?;
            println!("Created {new_key}");
        }
        DebugCommand::ClearAll { yes } => {
            if !confirm("Delete all data?", yes)? {
                println!("Aborted");
                return Ok(());
            }
            let keys = store.list_keys().await?;
            for key in &keys {
                store.remove(key).await?;
            }
            println!("Removed {} keys", keys.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::Duration;
    use tempfile::tempdir;

    use super::{process_debug_command, DebugCommand};
    use crate::{
        store::{file::FileKvStore, kv::KvStore},
        tracker::keys::date_key,
        utils::clock::{Clock, DefaultClock},
    };

    fn file_store(dir: &tempfile::TempDir) -> Arc<dyn KvStore> {
        Arc::new(FileKvStore::new(dir.path().to_path_buf()).unwrap())
    }

    #[tokio::test]
    async fn duplicate_copies_onto_an_earlier_canonical_key() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = file_store(&dir);
        store
            .set("stats-2024-06-05", r#"{"calories":300.0}"#)
            .await?;

        process_debug_command(
            store.clone(),
            DebugCommand::Duplicate {
                key: "stats-2024-06-05".into(),
                days_back: 3,
            },
        )
        .await?;

        let target_key = date_key(DefaultClock.today() - Duration::days(3));
        let copied = store.get(&target_key).await?.unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&copied)?["calories"],
            300.0
        );
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_refuses_non_record_values() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = file_store(&dir);
        store.set("last-date", "2024-06-05").await?;

        let result = process_debug_command(
            store,
            DebugCommand::Duplicate {
                key: "last-date".into(),
                days_back: 1,
            },
        )
        .await;

        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn clear_all_empties_the_store() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = file_store(&dir);
        store.set("stats-2024-06-05", "{}").await?;
        store.set("last-date", "2024-06-05").await?;

        process_debug_command(store.clone(), DebugCommand::ClearAll { yes: true }).await?;

        assert!(store.list_keys().await?.is_empty());
        Ok(())
    }
}
