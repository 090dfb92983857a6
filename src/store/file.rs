use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use super::kv::KvStore;

/// The main realization of [KvStore]. Every key becomes its own file under `root` so a write to
/// one key never touches a neighbouring record.
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        // Keys map directly to file names, so anything that would escape `root` is rejected.
        if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
            bail!("key {key:?} cannot be used as a store entry");
        }
        Ok(self.root.join(key))
    }

    async fn read_value(path: &Path) -> std::result::Result<Option<String>, std::io::Error> {
        let mut file = match File::open(path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        // Semi-safe acquire-release for a file
        file.lock_shared()?;
        let mut value = String::new();
        let result = file.read_to_string(&mut value).await;
        file.unlock_async().await?;
        result?;
        Ok(Some(value))
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        debug!("Reading {path:?}");
        Self::read_value(&path)
            .await
            .with_context(|| format!("reading store entry {key}"))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        debug!("Writing {path:?}");

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await
            .with_context(|| format!("opening store entry {key}"))?;
        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = async {
            file.write_all(value.as_bytes()).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        result.with_context(|| format!("writing store entry {key}"))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing store entry {key}")),
        }
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut keys = vec![];
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            // Keys are always utf-8; anything else was not written through this store and
            // would not round-trip back through `get`/`remove`.
            match entry.file_name().into_string() {
                Ok(key) => keys.push(key),
                Err(name) => warn!("Skipping store entry with non-utf8 name {name:?}"),
            }
        }
        Ok(keys)
    }
}
