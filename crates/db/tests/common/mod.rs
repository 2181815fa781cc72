#![allow(dead_code)]

use std::sync::Arc;

use sqlx::PgPool;

use foltia_core::cache::MemoryCache;
use foltia_db::catalog::SubtitleCache;
use foltia_db::models::subtitle::Subtitle;
use foltia_db::SubtitleCatalog;

/// Schedule time of broadcast `pid`: 2024-01-01, one hour per pid.
pub fn start_of(pid: i64) -> i64 {
    202401010000 + pid * 100
}

pub async fn seed_station(pool: &PgPool, station_id: i64, receiving: bool) {
    sqlx::query(
        "INSERT INTO foltia_station (stationid, stationname, receiving) VALUES ($1, $2, $3)",
    )
    .bind(station_id)
    .bind(format!("Station {station_id}"))
    .bind(i32::from(receiving))
    .execute(pool)
    .await
    .unwrap();
}

pub async fn seed_program(pool: &PgPool, t_id: i64, title: &str) {
    sqlx::query(
        "INSERT INTO foltia_program (tid, title, shorttitle, titleyomi, titleen) \
         VALUES ($1, $2, NULL, NULL, NULL)",
    )
    .bind(t_id)
    .bind(title)
    .execute(pool)
    .await
    .unwrap();
}

/// Insert a broadcast with no files attached. `pid` must be below 24.
pub async fn seed_subtitle(
    pool: &PgPool,
    p_id: i64,
    t_id: i64,
    station_id: i64,
    subtitle: Option<&str>,
) {
    sqlx::query(
        "INSERT INTO foltia_subtitle \
            (pid, tid, stationid, subtitle, startdatetime, enddatetime, startoffset, lengthmin) \
         VALUES ($1, $2, $3, $4, $5, $6, 0, 30)",
    )
    .bind(p_id)
    .bind(t_id)
    .bind(station_id)
    .bind(subtitle)
    .bind(start_of(p_id))
    .bind(start_of(p_id) + 30)
    .execute(pool)
    .await
    .unwrap();
}

/// Set a filename column directly, bypassing the satellite tables.
pub async fn set_column(pool: &PgPool, p_id: i64, column: &str, value: Option<&str>) {
    sqlx::query(&format!("UPDATE foltia_subtitle SET {column} = $1 WHERE pid = $2"))
        .bind(value)
        .bind(p_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*)::BIGINT FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// A catalog over `pool` plus a handle on its cache for assertions.
pub fn catalog(pool: &PgPool) -> (SubtitleCatalog, Arc<MemoryCache<Option<Subtitle>>>) {
    let cache = Arc::new(MemoryCache::<Option<Subtitle>>::new());
    let shared: Arc<SubtitleCache> = cache.clone();
    (SubtitleCatalog::new(pool.clone(), shared), cache)
}

pub fn pids(items: &[Subtitle]) -> Vec<i64> {
    items.iter().map(|s| s.p_id).collect()
}
