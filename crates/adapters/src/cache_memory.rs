//! In-memory video cache for the lifetime of the process

use async_trait::async_trait;
use eightify_domain::{CacheError, CachedVideo, VideoCache, VideoId};
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

/// How many videos the cache may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Grow until the process restarts
    #[default]
    Unbounded,
    /// Keep at most `n` videos, evicting the oldest-inserted first
    MaxEntries(usize),
}

impl CachePolicy {
    /// `0` means unbounded
    pub fn from_max_videos(max_videos: usize) -> Self {
        match max_videos {
            0 => CachePolicy::Unbounded,
            n => CachePolicy::MaxEntries(n),
        }
    }
}

#[derive(Default)]
struct Entries {
    videos: HashMap<VideoId, CachedVideo>,
    insertion_order: VecDeque<VideoId>,
}

/// In-memory video cache implementation
pub struct InMemoryVideoCache {
    policy: CachePolicy,
    entries: RwLock<Entries>,
}

impl InMemoryVideoCache {
    pub fn new() -> Self {
        Self::with_policy(CachePolicy::Unbounded)
    }

    pub fn with_policy(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: RwLock::new(Entries::default()),
        }
    }
}

impl Default for InMemoryVideoCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoCache for InMemoryVideoCache {
    async fn get(&self, id: &VideoId) -> Result<Option<CachedVideo>, CacheError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheError::Poisoned(e.to_string()))?;
        Ok(entries.videos.get(id).cloned())
    }

    async fn put(&self, entry: CachedVideo) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Poisoned(e.to_string()))?;

        let id = entry.video_id.clone();
        if entries.videos.insert(id.clone(), entry).is_none() {
            entries.insertion_order.push_back(id);
        }

        if let CachePolicy::MaxEntries(max) = self.policy {
            while entries.videos.len() > max {
                let Some(oldest) = entries.insertion_order.pop_front() else {
                    break;
                };
                entries.videos.remove(&oldest);
                tracing::debug!(video_id = %oldest, "Evicted video from cache");
            }
        }

        Ok(())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheError::Poisoned(e.to_string()))?;
        Ok(entries.videos.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eightify_domain::VideoStage;
    use time::OffsetDateTime;

    fn entry(id: &str) -> CachedVideo {
        CachedVideo::new(VideoId::parse(id).unwrap(), OffsetDateTime::now_utc())
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let cache = InMemoryVideoCache::new();
        let mut video = entry("dQw4w9WgXcQ");
        video.summary = Some("**Key Points**".to_string());
        video.advance(VideoStage::Summarized, OffsetDateTime::now_utc());

        cache.put(video).await.unwrap();

        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let retrieved = cache.get(&id).await.unwrap().unwrap();
        assert_eq!(retrieved.stage, VideoStage::Summarized);
        assert_eq!(retrieved.summary.as_deref(), Some("**Key Points**"));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = InMemoryVideoCache::new();
        let id = VideoId::parse("aaaaaaaaaaa").unwrap();
        assert!(cache.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_keeps_single_entry() {
        let cache = InMemoryVideoCache::with_policy(CachePolicy::MaxEntries(2));

        cache.put(entry("aaaaaaaaaaa")).await.unwrap();
        cache.put(entry("aaaaaaaaaaa")).await.unwrap();
        cache.put(entry("bbbbbbbbbbb")).await.unwrap();

        assert_eq!(cache.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_max_entries_evicts_oldest() {
        let cache = InMemoryVideoCache::with_policy(CachePolicy::MaxEntries(2));

        cache.put(entry("aaaaaaaaaaa")).await.unwrap();
        cache.put(entry("bbbbbbbbbbb")).await.unwrap();
        cache.put(entry("ccccccccccc")).await.unwrap();

        assert_eq!(cache.len().await.unwrap(), 2);
        let oldest = VideoId::parse("aaaaaaaaaaa").unwrap();
        assert!(cache.get(&oldest).await.unwrap().is_none());
        let newest = VideoId::parse("ccccccccccc").unwrap();
        assert!(cache.get(&newest).await.unwrap().is_some());
    }

    #[test]
    fn test_policy_from_max_videos() {
        assert_eq!(CachePolicy::from_max_videos(0), CachePolicy::Unbounded);
        assert_eq!(CachePolicy::from_max_videos(50), CachePolicy::MaxEntries(50));
    }
}
