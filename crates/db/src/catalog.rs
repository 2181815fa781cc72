//! Cached access to the broadcast catalog.
//!
//! [`SubtitleCatalog`] wraps [`SubtitleRepo`] with a read-through cache
//! keyed by `pid`. Every mutation evicts the affected key before the entity
//! is read back, so callers always receive the post-write state.

use std::collections::BTreeSet;
use std::sync::Arc;

use sqlx::PgPool;

use foltia_core::cache::{self, Cache};
use foltia_core::types::DbId;
use foltia_core::video::VideoType;

use crate::error::{DbError, DbResult};
use crate::models::subtitle::{
    Subtitle, SubtitlePage, SubtitleQuery, UpdateSubtitle, DEFAULT_PAGE_ROWS,
};
use crate::repositories::SubtitleRepo;

/// Cache region holding broadcasts.
pub const CACHE_REGION: &str = "subtitle";

/// Cache key for a broadcast id.
pub fn cache_key(p_id: DbId) -> String {
    format!("pid={p_id}")
}

/// Values stored in the broadcast cache. `None` records a known-missing id.
pub type SubtitleCache = dyn Cache<Option<Subtitle>>;

/// Broadcast catalog backed by PostgreSQL and an injected cache.
#[derive(Clone)]
pub struct SubtitleCatalog {
    pool: PgPool,
    cache: Arc<SubtitleCache>,
    default_page_rows: i64,
}

impl SubtitleCatalog {
    pub fn new(pool: PgPool, cache: Arc<SubtitleCache>) -> Self {
        Self {
            pool,
            cache,
            default_page_rows: DEFAULT_PAGE_ROWS,
        }
    }

    /// Override the page size used by [`find`](Self::find).
    pub fn with_default_page_rows(mut self, page_rows: i64) -> Self {
        self.default_page_rows = page_rows;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a broadcast by id.
    ///
    /// Misses are cached as well, so repeated lookups of an unknown id reach
    /// the database once until something evicts the key.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, p_id: DbId) -> DbResult<Option<Subtitle>> {
        let key = cache_key(p_id);
        cache::get_or_compute(self.cache.as_ref(), CACHE_REGION, &key, || {
            SubtitleRepo::find_by_id(&self.pool, p_id)
        })
        .await
    }

    /// Search with the default page size.
    pub async fn find(&self, query: &SubtitleQuery, page: i64) -> DbResult<SubtitlePage> {
        self.find_with_page_rows(query, page, self.default_page_rows)
            .await
    }

    /// Search with an explicit page size. Results are never cached.
    #[tracing::instrument(skip(self))]
    pub async fn find_with_page_rows(
        &self,
        query: &SubtitleQuery,
        page: i64,
        page_rows: i64,
    ) -> DbResult<SubtitlePage> {
        SubtitleRepo::find(&self.pool, query, page, page_rows).await
    }

    /// Apply a partial update and evict the broadcast from the cache.
    ///
    /// Returns `true` if the broadcast exists.
    #[tracing::instrument(skip(self), fields(p_id = input.p_id))]
    pub async fn update(&self, input: &UpdateSubtitle) -> DbResult<bool> {
        let updated = SubtitleRepo::update(&self.pool, input).await?;
        self.invalidate(input.p_id).await;
        Ok(updated)
    }

    /// Attach a video file and return the refreshed broadcast.
    ///
    /// `resolver` picks the filename from the current broadcast. Returns
    /// `None` without writing anything if `p_id` does not exist.
    #[tracing::instrument(skip(self, resolver))]
    pub async fn update_video<F>(
        &self,
        p_id: DbId,
        video_type: VideoType,
        resolver: F,
    ) -> DbResult<Option<Subtitle>>
    where
        F: FnOnce(&Subtitle, VideoType) -> String,
    {
        let Some(filename) =
            SubtitleRepo::attach_video(&self.pool, p_id, video_type, resolver).await?
        else {
            return Ok(None);
        };
        tracing::info!(p_id, %video_type, %filename, "Video attached");

        self.invalidate(p_id).await;
        self.get(p_id).await
    }

    /// Detach video files and return `(before, after)` snapshots.
    ///
    /// Returns `None` if `p_id` does not exist. An empty `video_types` is
    /// rejected before anything is read.
    #[tracing::instrument(skip(self))]
    pub async fn delete_video(
        &self,
        p_id: DbId,
        video_types: &BTreeSet<VideoType>,
    ) -> DbResult<Option<(Subtitle, Subtitle)>> {
        let Some(before) = SubtitleRepo::detach_videos(&self.pool, p_id, video_types).await?
        else {
            return Ok(None);
        };
        for video_type in video_types {
            if let Some(filename) = before.video_filename(*video_type) {
                tracing::info!(p_id, %video_type, filename, "Video detached");
            }
        }

        self.invalidate(p_id).await;
        let after = self.get(p_id).await?.ok_or(DbError::Vanished { p_id })?;
        Ok(Some((before, after)))
    }

    /// Drop the cached entry for a broadcast.
    pub async fn invalidate(&self, p_id: DbId) {
        let evicted = self.cache.evict(CACHE_REGION, &cache_key(p_id)).await;
        tracing::debug!(p_id, evicted, "Subtitle cache entry invalidated");
    }
}
