//! Broadcast (`foltia_subtitle`) entity models and DTOs.
//!
//! [`SubtitleRow`] mirrors the table's raw column types. [`Subtitle`] is the
//! decoded entity handed to callers; the conversion between them is where
//! coded columns are validated.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use foltia_core::broadcast_time;
use foltia_core::error::CoreError;
use foltia_core::recording::{
    FileStatus, RecordingType, SyobocalFlag, SyobocalFlags, TranscodeQuality,
};
use foltia_core::types::{BroadcastTime, DbId, Timestamp};
use foltia_core::video::VideoType;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_ROWS: i64 = 100;

// ---------------------------------------------------------------------------
// Raw row
// ---------------------------------------------------------------------------

/// One `foltia_subtitle` row exactly as stored.
#[derive(Debug, Clone, FromRow)]
pub struct SubtitleRow {
    pub pid: DbId,
    pub tid: DbId,
    pub stationid: DbId,
    pub countno: Option<i64>,
    pub subtitle: Option<String>,
    pub startdatetime: i64,
    pub enddatetime: i64,
    pub startoffset: i64,
    pub lengthmin: i64,
    pub m2pfilename: Option<String>,
    pub pspfilename: Option<String>,
    pub epgaddedby: Option<i64>,
    pub lastupdate: Option<Timestamp>,
    pub filestatus: Option<i32>,
    pub aspect: Option<i32>,
    pub encodesetting: Option<i32>,
    pub mp4hd: Option<String>,
    pub syobocalflag: Option<i32>,
    pub syobocalrev: i32,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A scheduled or recorded broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtitle {
    pub p_id: DbId,
    pub t_id: DbId,
    pub station_id: DbId,
    pub count_no: Option<i64>,
    pub subtitle: Option<String>,
    pub start_date_time: BroadcastTime,
    pub end_date_time: BroadcastTime,
    pub start_offset: i64,
    pub length_min: i64,
    pub m2p_filename: Option<String>,
    pub psp_filename: Option<String>,
    pub epg_added_by: Option<i64>,
    pub last_update: Option<Timestamp>,
    pub file_status: Option<FileStatus>,
    pub aspect: Option<i32>,
    pub encode_setting: Option<TranscodeQuality>,
    pub mp4hd: Option<String>,
    pub syobocal_flag: SyobocalFlags,
    pub syobocal_rev: i32,
}

impl Subtitle {
    /// Category derived from the program id.
    pub fn recording_type(&self) -> Option<RecordingType> {
        RecordingType::from_t_id(self.t_id)
    }

    /// The attached filename for a video format, if any.
    pub fn video_filename(&self, video_type: VideoType) -> Option<&str> {
        match video_type {
            VideoType::Ts => self.m2p_filename.as_deref(),
            VideoType::Sd => self.psp_filename.as_deref(),
            VideoType::Hd => self.mp4hd.as_deref(),
        }
    }
}

impl TryFrom<SubtitleRow> for Subtitle {
    type Error = CoreError;

    fn try_from(row: SubtitleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            p_id: row.pid,
            t_id: row.tid,
            station_id: row.stationid,
            count_no: row.countno,
            subtitle: row.subtitle,
            start_date_time: broadcast_time::decode("startdatetime", row.startdatetime)?,
            end_date_time: broadcast_time::decode("enddatetime", row.enddatetime)?,
            start_offset: row.startoffset,
            length_min: row.lengthmin,
            m2p_filename: row.m2pfilename,
            psp_filename: row.pspfilename,
            epg_added_by: row.epgaddedby,
            last_update: row.lastupdate,
            file_status: row.filestatus.map(FileStatus::from_code).transpose()?,
            aspect: row.aspect,
            encode_setting: row
                .encodesetting
                .map(TranscodeQuality::from_code)
                .transpose()?,
            mp4hd: row.mp4hd,
            syobocal_flag: row
                .syobocalflag
                .map(SyobocalFlag::from_bits)
                .unwrap_or_default(),
            syobocal_rev: row.syobocalrev,
        })
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for searching broadcasts. Absent fields add no condition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleQuery {
    pub t_id: Option<DbId>,
    pub recording_type: Option<RecordingType>,
    pub receivable_station: Option<bool>,
    /// `true`: some attached file has a satellite row. `false`: no file attached.
    pub has_recording: Option<bool>,
    /// Substring matched against the episode title and the program titles.
    pub keyword: Option<String>,
}

/// Paginated response for broadcast searches.
#[derive(Debug, Clone, Serialize)]
pub struct SubtitlePage {
    pub page: i64,
    pub total: i64,
    pub items: Vec<Subtitle>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// DTO for a partial update.
///
/// Each `*_defined` flag says whether the caller meant to touch that field at
/// all. A field is written only when its flag is set and the value is present
/// (and, for `subtitle`, not blank).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubtitle {
    pub p_id: DbId,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub subtitle_defined: bool,
    pub file_status: Option<FileStatus>,
    #[serde(default)]
    pub file_status_defined: bool,
    pub encode_setting: Option<TranscodeQuality>,
    #[serde(default)]
    pub encode_setting_defined: bool,
}

impl UpdateSubtitle {
    /// The subtitle text to write, if the update qualifies.
    pub fn effective_subtitle(&self) -> Option<&str> {
        self.subtitle
            .as_deref()
            .filter(|s| self.subtitle_defined && !s.trim().is_empty())
    }

    /// The file status to write, if the update qualifies.
    pub fn effective_file_status(&self) -> Option<FileStatus> {
        self.file_status.filter(|_| self.file_status_defined)
    }

    /// The encode setting to write, if the update qualifies.
    pub fn effective_encode_setting(&self) -> Option<TranscodeQuality> {
        self.encode_setting.filter(|_| self.encode_setting_defined)
    }

    /// Returns `true` if at least one field would be written.
    pub fn has_effect(&self) -> bool {
        self.effective_subtitle().is_some()
            || self.effective_file_status().is_some()
            || self.effective_encode_setting().is_some()
    }
}
