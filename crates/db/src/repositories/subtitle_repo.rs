//! Repository for the `foltia_subtitle` table and its video satellite tables.

use std::collections::BTreeSet;

use sqlx::{PgConnection, PgPool};

use foltia_core::error::CoreError;
use foltia_core::recording::{Code, RecordingType};
use foltia_core::types::DbId;
use foltia_core::video::VideoType;

use crate::error::{DbError, DbResult};
use crate::models::subtitle::{Subtitle, SubtitlePage, SubtitleQuery, SubtitleRow, UpdateSubtitle};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for single-table `foltia_subtitle` SELECT queries.
const COLUMNS: &str = "\
    pid, tid, stationid, countno, subtitle, startdatetime, enddatetime, \
    startoffset, lengthmin, m2pfilename, pspfilename, epgaddedby, lastupdate, \
    filestatus, aspect, encodesetting, mp4hd, syobocalflag, syobocalrev";

/// Column list for joined queries where `foltia_subtitle` is aliased `S`.
const QUALIFIED_COLUMNS: &str = "\
    S.pid, S.tid, S.stationid, S.countno, S.subtitle, S.startdatetime, S.enddatetime, \
    S.startoffset, S.lengthmin, S.m2pfilename, S.pspfilename, S.epgaddedby, S.lastupdate, \
    S.filestatus, S.aspect, S.encodesetting, S.mp4hd, S.syobocalflag, S.syobocalrev";

/// Shared FROM clause for searches. Inner joins drop rows whose program or
/// station cannot be resolved.
const SEARCH_FROM: &str = "\
    FROM foltia_subtitle AS S \
    INNER JOIN foltia_program AS P ON S.tid = P.tid \
    INNER JOIN foltia_station AS ST ON S.stationid = ST.stationid";

/// Columns searched by the keyword filter.
const KEYWORD_COLUMNS: &[&str] = &[
    "S.subtitle",
    "P.title",
    "P.shorttitle",
    "P.titleyomi",
    "P.titleen",
];

// ---------------------------------------------------------------------------
// SubtitleRepo
// ---------------------------------------------------------------------------

/// Provides search, lookup and update operations for broadcasts.
pub struct SubtitleRepo;

impl SubtitleRepo {
    /// Find a broadcast by `pid`.
    pub async fn find_by_id(pool: &PgPool, p_id: DbId) -> DbResult<Option<Subtitle>> {
        let query = format!("SELECT {COLUMNS} FROM foltia_subtitle WHERE pid = $1");
        let row = sqlx::query_as::<_, SubtitleRow>(&query)
            .bind(p_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Subtitle::try_from).transpose()?)
    }

    /// Search broadcasts with filtering and pagination, newest first.
    ///
    /// `page` is zero-based. `total` counts every match, not just this page.
    pub async fn find(
        pool: &PgPool,
        params: &SubtitleQuery,
        page: i64,
        page_rows: i64,
    ) -> DbResult<SubtitlePage> {
        let (limit, offset) = page_window(page, page_rows)?;
        let (where_clause, bind_values, bind_idx) = build_subtitle_filter(params);

        let query = format!(
            "SELECT {QUALIFIED_COLUMNS} {SEARCH_FROM} {where_clause} \
             ORDER BY S.startdatetime DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );
        tracing::debug!(%query, page, page_rows, "Searching subtitles");

        let rows = bind_subtitle_values(sqlx::query_as::<_, SubtitleRow>(&query), &bind_values)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        let items = rows
            .into_iter()
            .map(Subtitle::try_from)
            .collect::<Result<Vec<_>, CoreError>>()?;

        let total = Self::count(pool, params).await?;

        Ok(SubtitlePage { page, total, items })
    }

    /// Count broadcasts matching the given filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &SubtitleQuery) -> DbResult<i64> {
        let (where_clause, bind_values, _) = build_subtitle_filter(params);

        let query = format!("SELECT COUNT(*)::BIGINT AS count {SEARCH_FROM} {where_clause}");

        let total = bind_subtitle_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values)
            .fetch_one(pool)
            .await?;
        Ok(total)
    }

    /// Apply a partial update. Only qualifying fields are written.
    ///
    /// Returns `true` if a row with `input.p_id` exists. An update with no
    /// qualifying field is rejected with [`DbError::EmptyMutation`].
    pub async fn update(pool: &PgPool, input: &UpdateSubtitle) -> DbResult<bool> {
        if !input.has_effect() {
            tracing::warn!(p_id = input.p_id, "Rejected subtitle update with no effective field");
            return Err(DbError::EmptyMutation("no field qualifies for update"));
        }

        let mut sets: Vec<String> = Vec::new();
        let mut bind_values: Vec<BindValue> = Vec::new();
        // $1 is pid
        let mut push = |column: &str, value: BindValue| {
            sets.push(format!("{column} = ${}", bind_values.len() + 2));
            bind_values.push(value);
        };

        if let Some(subtitle) = input.effective_subtitle() {
            push("subtitle", BindValue::Text(subtitle.to_string()));
        }
        if let Some(status) = input.effective_file_status() {
            push("filestatus", BindValue::Int(status.code()));
        }
        if let Some(setting) = input.effective_encode_setting() {
            push("encodesetting", BindValue::Int(setting.code()));
        }

        let query = format!(
            "UPDATE foltia_subtitle SET {} WHERE pid = $1",
            sets.join(", ")
        );

        let mut q = sqlx::query(&query).bind(input.p_id);
        for val in &bind_values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Int(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
            };
        }

        let result = q.execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach a video file to a broadcast.
    ///
    /// Locks the row, asks `resolver` for the filename, points the format's
    /// column at it and records it in the satellite table. Both writes share
    /// one transaction. Re-attaching an existing satellite key is a no-op.
    ///
    /// Returns the attached filename, or `None` if `p_id` does not exist.
    pub async fn attach_video<F>(
        pool: &PgPool,
        p_id: DbId,
        video_type: VideoType,
        resolver: F,
    ) -> DbResult<Option<String>>
    where
        F: FnOnce(&Subtitle, VideoType) -> String,
    {
        let mut tx = pool.begin().await?;

        let Some(subtitle) = lock_by_id(&mut *tx, p_id).await? else {
            return Ok(None);
        };
        let filename = resolver(&subtitle, video_type);
        let table = video_type.table();

        // Point the main row at the file
        let query = format!(
            "UPDATE foltia_subtitle SET {} = $1 WHERE pid = $2",
            table.subtitle_column
        );
        sqlx::query(&query)
            .bind(&filename)
            .bind(p_id)
            .execute(&mut *tx)
            .await?;

        // Record the file in the satellite table
        if table.keyed_by_program {
            let query = format!(
                "INSERT INTO {} (tid, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                table.table, table.file_column
            );
            sqlx::query(&query)
                .bind(subtitle.t_id)
                .bind(&filename)
                .execute(&mut *tx)
                .await?;
        } else {
            let query = format!(
                "INSERT INTO {} ({}) VALUES ($1) ON CONFLICT DO NOTHING",
                table.table, table.file_column
            );
            sqlx::query(&query)
                .bind(&filename)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(filename))
    }

    /// Detach video files from a broadcast.
    ///
    /// Clears every requested format's column in one UPDATE, then deletes the
    /// satellite row of each format that had a filename before the update.
    /// SD and HD rows are matched on `(tid, filename)`, TS rows on filename.
    /// Formats that were already empty are skipped. All statements share one
    /// transaction.
    ///
    /// Returns the broadcast as it was before the update, or `None` if `p_id`
    /// does not exist. An empty `video_types` is rejected.
    pub async fn detach_videos(
        pool: &PgPool,
        p_id: DbId,
        video_types: &BTreeSet<VideoType>,
    ) -> DbResult<Option<Subtitle>> {
        if video_types.is_empty() {
            tracing::warn!(p_id, "Rejected video detach with no formats");
            return Err(DbError::EmptyMutation("no video type to detach"));
        }

        let mut tx = pool.begin().await?;

        let Some(before) = lock_by_id(&mut *tx, p_id).await? else {
            return Ok(None);
        };

        let sets: Vec<String> = video_types
            .iter()
            .map(|vt| format!("{} = NULL", vt.table().subtitle_column))
            .collect();
        let query = format!(
            "UPDATE foltia_subtitle SET {} WHERE pid = $1",
            sets.join(", ")
        );
        sqlx::query(&query).bind(p_id).execute(&mut *tx).await?;

        for video_type in video_types {
            let Some(filename) = before.video_filename(*video_type) else {
                continue;
            };
            let table = video_type.table();
            if table.keyed_by_program {
                let query = format!(
                    "DELETE FROM {} WHERE tid = $1 AND {} = $2",
                    table.table, table.file_column
                );
                sqlx::query(&query)
                    .bind(before.t_id)
                    .bind(filename)
                    .execute(&mut *tx)
                    .await?;
            } else {
                let query = format!(
                    "DELETE FROM {} WHERE {} = $1",
                    table.table, table.file_column
                );
                sqlx::query(&query)
                    .bind(filename)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(before))
    }
}

/// Read a broadcast inside a transaction, holding a row lock until commit.
async fn lock_by_id(conn: &mut PgConnection, p_id: DbId) -> DbResult<Option<Subtitle>> {
    let query = format!("SELECT {COLUMNS} FROM foltia_subtitle WHERE pid = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, SubtitleRow>(&query)
        .bind(p_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(Subtitle::try_from).transpose()?)
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built subtitle queries.
#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    BigInt(i64),
    Int(Code),
    Text(String),
}

/// Validate pagination and return `(limit, offset)`.
fn page_window(page: i64, page_rows: i64) -> Result<(i64, i64), CoreError> {
    if page_rows <= 0 {
        return Err(CoreError::Validation(format!(
            "page_rows must be positive, got {page_rows}"
        )));
    }
    if page < 0 {
        return Err(CoreError::Validation(format!(
            "page must not be negative, got {page}"
        )));
    }
    let offset = page_rows
        .checked_mul(page)
        .ok_or_else(|| CoreError::Validation(format!("page {page} is out of range")))?;
    Ok((page_rows, offset))
}

/// Escape LIKE metacharacters so caller text matches literally.
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// SQL condition for a recording category.
fn recording_type_condition(recording_type: RecordingType) -> &'static str {
    match recording_type {
        RecordingType::Program => "S.tid > 0",
        RecordingType::Epg => "S.tid = 0",
        RecordingType::Keyword => "S.tid = -1",
    }
}

/// SQL condition matching rows with at least one attached file that also has
/// a satellite row.
fn has_recording_condition() -> String {
    let parts: Vec<String> = VideoType::ALL
        .iter()
        .map(|vt| {
            let t = vt.table();
            format!(
                "(S.{col} IS NOT NULL AND \
                 EXISTS(SELECT 1 FROM {table} AS V WHERE V.{file} = S.{col}))",
                col = t.subtitle_column,
                table = t.table,
                file = t.file_column,
            )
        })
        .collect();
    format!("({})", parts.join(" OR "))
}

/// SQL condition matching rows with no attached file at all.
fn no_recording_condition() -> String {
    let parts: Vec<String> = VideoType::ALL
        .iter()
        .map(|vt| format!("S.{} IS NULL", vt.table().subtitle_column))
        .collect();
    format!("({})", parts.join(" AND "))
}

/// Build a WHERE clause and bind values from `SubtitleQuery` filter parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
/// The `where_clause` is empty if no filters are active, or starts with `WHERE `.
fn build_subtitle_filter(params: &SubtitleQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(t_id) = params.t_id {
        conditions.push(format!("S.tid = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(t_id));
    }

    if let Some(recording_type) = params.recording_type {
        conditions.push(recording_type_condition(recording_type).to_string());
    }

    if let Some(receivable) = params.receivable_station {
        conditions.push(format!("ST.receiving = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Int(i32::from(receivable)));
    }

    match params.has_recording {
        Some(true) => conditions.push(has_recording_condition()),
        Some(false) => conditions.push(no_recording_condition()),
        None => {}
    }

    if let Some(ref keyword) = params.keyword {
        let alternatives: Vec<String> = KEYWORD_COLUMNS
            .iter()
            .map(|col| format!("{col} LIKE ${bind_idx}"))
            .collect();
        conditions.push(format!("({})", alternatives.join(" OR ")));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{}%", escape_like(keyword))));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_subtitle_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Int(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_subtitle_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Int(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
        }
    }
    q
}
