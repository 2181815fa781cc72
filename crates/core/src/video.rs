//! Video file formats and the tables that track them.
//!
//! A broadcast row references at most one file per format through a column
//! on `foltia_subtitle`. Every referenced file also has a row in that
//! format's satellite table. TS files are keyed by filename alone; SD and HD
//! transcodes are keyed by `(tid, filename)`.

use serde::{Deserialize, Serialize};

/// Video file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VideoType {
    /// Raw MPEG-2 transport stream.
    Ts,
    /// SD transcode.
    Sd,
    /// HD transcode.
    Hd,
}

/// Where a video format lives in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTable {
    /// Satellite table name.
    pub table: &'static str,
    /// Filename column in the satellite table.
    pub file_column: &'static str,
    /// Filename column on `foltia_subtitle`.
    pub subtitle_column: &'static str,
    /// Whether the satellite key also includes `tid`.
    pub keyed_by_program: bool,
}

const TS_TABLE: VideoTable = VideoTable {
    table: "foltia_m2pfiles",
    file_column: "m2pfilename",
    subtitle_column: "m2pfilename",
    keyed_by_program: false,
};

const SD_TABLE: VideoTable = VideoTable {
    table: "foltia_mp4files",
    file_column: "mp4filename",
    subtitle_column: "pspfilename",
    keyed_by_program: true,
};

const HD_TABLE: VideoTable = VideoTable {
    table: "foltia_hdmp4files",
    file_column: "hdmp4filename",
    subtitle_column: "mp4hd",
    keyed_by_program: true,
};

impl VideoType {
    pub const ALL: &'static [VideoType] = &[VideoType::Ts, VideoType::Sd, VideoType::Hd];

    /// Schema location for this format.
    pub fn table(self) -> &'static VideoTable {
        match self {
            VideoType::Ts => &TS_TABLE,
            VideoType::Sd => &SD_TABLE,
            VideoType::Hd => &HD_TABLE,
        }
    }

    /// Parse a format name case-insensitively (`ts`, `sd`, `hd`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TS" => Some(VideoType::Ts),
            "SD" => Some(VideoType::Sd),
            "HD" => Some(VideoType::Hd),
            _ => None,
        }
    }
}

impl std::fmt::Display for VideoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VideoType::Ts => "TS",
            VideoType::Sd => "SD",
            VideoType::Hd => "HD",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ts_is_keyed_by_filename_alone() {
        assert!(!VideoType::Ts.table().keyed_by_program);
        assert!(VideoType::Sd.table().keyed_by_program);
        assert!(VideoType::Hd.table().keyed_by_program);
    }

    #[test]
    fn test_subtitle_columns_are_distinct() {
        let columns: std::collections::HashSet<_> = VideoType::ALL
            .iter()
            .map(|vt| vt.table().subtitle_column)
            .collect();
        assert_eq!(columns.len(), VideoType::ALL.len());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(VideoType::parse("hd"), Some(VideoType::Hd));
        assert_eq!(VideoType::parse("Ts"), Some(VideoType::Ts));
        assert_eq!(VideoType::parse("4k"), None);
        assert_eq!(VideoType::Sd.to_string(), "SD");
    }
}
