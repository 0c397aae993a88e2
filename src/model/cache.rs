//! Cache for liked songs to enable fast lookup without refetching the user

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

const CACHE_DIR: &str = ".cache";

/// Per-user set of liked song ids, persisted as a JSON id list next to the
/// session cache.
#[derive(Clone)]
pub struct LikedSongsCache {
    cache_dir: PathBuf,
    user_id: Arc<RwLock<Option<String>>>,
    liked_ids: Arc<RwLock<HashSet<String>>>,
}

impl LikedSongsCache {
    pub fn new() -> Self {
        Self::with_dir(CACHE_DIR)
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: dir.into(),
            user_id: Arc::new(RwLock::new(None)),
            liked_ids: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    fn file_path(&self, user_id: &str) -> PathBuf {
        self.cache_dir.join(format!("liked_songs_{}.json", user_id))
    }

    /// Point the cache at a user's file and drop any previous user's ids.
    pub async fn set_user(&self, user_id: &str) {
        let mut current = self.user_id.write().await;
        *current = Some(user_id.to_string());
        let mut liked_ids = self.liked_ids.write().await;
        liked_ids.clear();
    }

    pub async fn load_from_disk(&self) -> Result<()> {
        let user_id = self.user_id.read().await;
        let Some(user_id) = user_id.as_deref() else {
            return Ok(());
        };

        let path = self.file_path(user_id);
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let ids: Vec<String> = serde_json::from_str(&content)?;
            let mut liked_ids = self.liked_ids.write().await;
            *liked_ids = ids.into_iter().collect();
        }
        Ok(())
    }

    pub async fn save_to_disk(&self) -> Result<()> {
        let user_id = self.user_id.read().await;
        let Some(user_id) = user_id.as_deref() else {
            return Ok(());
        };

        if !Path::new(&self.cache_dir).exists() {
            std::fs::create_dir_all(&self.cache_dir)?;
        }

        let liked_ids = self.liked_ids.read().await;
        let ids: Vec<&String> = liked_ids.iter().collect();
        let content = serde_json::to_string(&ids)?;
        std::fs::write(self.file_path(user_id), content)?;
        Ok(())
    }

    pub async fn is_liked(&self, song_id: &str) -> bool {
        let liked_ids = self.liked_ids.read().await;
        liked_ids.contains(song_id)
    }

    /// Flip a song's liked state and report the new state.
    pub async fn toggle(&self, song_id: &str) -> bool {
        let mut liked_ids = self.liked_ids.write().await;
        if liked_ids.remove(song_id) {
            false
        } else {
            liked_ids.insert(song_id.to_string());
            true
        }
    }

    pub async fn snapshot(&self) -> HashSet<String> {
        let liked_ids = self.liked_ids.read().await;
        liked_ids.clone()
    }
}

impl Default for LikedSongsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LikedSongsCache::with_dir(dir.path());
        cache.set_user("u1").await;
        cache.toggle("s1").await;
        cache.toggle("s2").await;
        cache.save_to_disk().await.unwrap();

        let reloaded = LikedSongsCache::with_dir(dir.path());
        reloaded.set_user("u1").await;
        reloaded.load_from_disk().await.unwrap();

        assert!(reloaded.is_liked("s1").await);
        assert!(reloaded.is_liked("s2").await);
        assert!(!reloaded.is_liked("s3").await);
    }

    #[tokio::test]
    async fn toggle_reports_new_state() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LikedSongsCache::with_dir(dir.path());
        cache.set_user("u1").await;

        assert!(cache.toggle("s1").await);
        assert!(cache.is_liked("s1").await);
        assert!(!cache.toggle("s1").await);
        assert!(!cache.is_liked("s1").await);
    }

    #[tokio::test]
    async fn switching_user_drops_previous_ids() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LikedSongsCache::with_dir(dir.path());
        cache.set_user("u1").await;
        cache.toggle("s1").await;

        cache.set_user("u2").await;

        assert!(!cache.is_liked("s1").await);
    }
}
