use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Logical key for the quiz result history blob.
pub const RESULTS_KEY: &str = "quiz_results";
/// Logical key for the current session profile snapshot.
pub const PROFILE_KEY: &str = "current_profile";

/// Durable key/value fallback store. Each key is one JSON file holding the
/// whole value; reads and writes go through an in-process mutex, but across
/// processes the read-modify-write is last-write-wins.
#[derive(Clone)]
pub struct LocalStore {
    dir: PathBuf,
    guard: Arc<Mutex<()>>,
}

impl LocalStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            guard: Arc::new(Mutex::new(())),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let _held = self.guard.lock().await;
        self.read_unlocked(key).await
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let _held = self.guard.lock().await;
        self.write_unlocked(key, value).await
    }

    /// Read-modify-write under a single lock hold.
    pub async fn update<T, F>(&self, key: &str, default: T, apply: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let _held = self.guard.lock().await;
        let current = self.read_unlocked(key).await?.unwrap_or(default);
        let updated = apply(current);
        self.write_unlocked(key, &updated).await?;
        Ok(updated)
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let _held = self.guard.lock().await;
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_unlocked<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path_for(key);
        let raw = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_slice(&raw)?;
        Ok(Some(value))
    }

    async fn write_unlocked<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let raw = serde_json::to_vec_pretty(value)?;
        fs::write(self.path_for(key), raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("tutorlink_store_{}", uuid::Uuid::new_v4()));
        LocalStore::new(dir)
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = temp_store();
        let got: Option<Vec<String>> = store.get(RESULTS_KEY).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn put_then_get_round_trips_whole_value() {
        let store = temp_store();
        store
            .put(RESULTS_KEY, &vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        let got: Option<Vec<String>> = store.get(RESULTS_KEY).await.unwrap();
        assert_eq!(got, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[tokio::test]
    async fn update_appends_into_existing_list() {
        let store = temp_store();
        store.put(RESULTS_KEY, &vec![1i64]).await.unwrap();
        let updated = store
            .update(RESULTS_KEY, Vec::new(), |mut list: Vec<i64>| {
                list.push(2);
                list
            })
            .await
            .unwrap();
        assert_eq!(updated, vec![1, 2]);
    }

    #[tokio::test]
    async fn remove_clears_the_key() {
        let store = temp_store();
        store.put(PROFILE_KEY, &"someone").await.unwrap();
        store.remove(PROFILE_KEY).await.unwrap();
        let got: Option<String> = store.get(PROFILE_KEY).await.unwrap();
        assert!(got.is_none());
    }
}
