//! Coded enumerations stored on `foltia_subtitle` rows.
//!
//! Each coded enum maps a closed set of integer codes to named variants.
//! Decoding an unknown code is an error: it means the row was written by
//! something that does not agree with this catalog about the code table.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Integer code type matching INTEGER columns in the database.
pub type Code = i32;

macro_rules! define_coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($field:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant, in code order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Return the stored integer code.
            pub fn code(self) -> Code {
                self as Code
            }

            /// Decode a stored integer code.
            pub fn from_code(code: Code) -> Result<Self, CoreError> {
                match code {
                    $( $val => Ok($name::$variant), )+
                    other => Err(CoreError::InvalidCode {
                        field: $field,
                        code: i64::from(other),
                    }),
                }
            }
        }

        impl From<$name> for Code {
            fn from(value: $name) -> Self {
                value as Code
            }
        }

        impl TryFrom<Code> for $name {
            type Error = CoreError;

            fn try_from(code: Code) -> Result<Self, Self::Error> {
                Self::from_code(code)
            }
        }
    };
}

define_coded_enum! {
    /// Recording and transcoding pipeline state of a broadcast.
    FileStatus ("filestatus") {
        ReservingLong = 10,
        ReservingShort = 20,
        Recording = 30,
        RecTsSplitting = 40,
        RecEnd = 50,
        WaitingCapture = 55,
        Capture = 60,
        CapEnd = 70,
        ThumbnailCreate = 72,
        TranscodeTsSplitting = 80,
        TranscodeFfmpeg = 90,
        TranscodeWave = 100,
        TranscodeAac = 110,
        TranscodeMp4Box = 120,
        TranscodeAtom = 130,
        TranscodeComplete = 200,
        NotRecording = 999,
    }
}

define_coded_enum! {
    /// Transcode quality preset applied to a recording.
    TranscodeQuality ("encodesetting") {
        Default = 0,
        Low = 1,
        Middle = 2,
        High = 3,
        Highest = 4,
    }
}

// ---------------------------------------------------------------------------
// Recording type
// ---------------------------------------------------------------------------

/// Category of a broadcast row, fully determined by the sign of its program id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordingType {
    /// `tid > 0`: recorded because the program is subscribed.
    Program,
    /// `tid == 0`: EPG-only entry.
    Epg,
    /// `tid == -1`: recorded because a keyword matched.
    Keyword,
}

impl RecordingType {
    /// Classify a program id. Negative ids other than `-1` have no category.
    pub fn from_t_id(t_id: i64) -> Option<Self> {
        match t_id {
            t if t > 0 => Some(Self::Program),
            0 => Some(Self::Epg),
            -1 => Some(Self::Keyword),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Syobocal flags
// ---------------------------------------------------------------------------

/// One bit of the `syobocalflag` bitmask imported from the Syoboi Calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SyobocalFlag {
    /// Schedule note attached.
    Attention,
    /// First episode.
    New,
    /// Final episode.
    Final,
    /// Rerun.
    Rerun,
}

/// Decoded `syobocalflag` column. An absent column decodes to an empty set.
pub type SyobocalFlags = BTreeSet<SyobocalFlag>;

impl SyobocalFlag {
    pub const ALL: &'static [SyobocalFlag] = &[
        SyobocalFlag::Attention,
        SyobocalFlag::New,
        SyobocalFlag::Final,
        SyobocalFlag::Rerun,
    ];

    /// The bit this flag occupies in the stored mask.
    pub fn bit(self) -> Code {
        match self {
            SyobocalFlag::Attention => 0x01,
            SyobocalFlag::New => 0x02,
            SyobocalFlag::Final => 0x04,
            SyobocalFlag::Rerun => 0x08,
        }
    }

    /// Decode a stored mask. Bits without a named flag are dropped.
    pub fn from_bits(mask: Code) -> SyobocalFlags {
        Self::ALL
            .iter()
            .copied()
            .filter(|flag| mask & flag.bit() != 0)
            .collect()
    }

    /// Encode a flag set back into a mask.
    pub fn to_bits(flags: &SyobocalFlags) -> Code {
        flags.iter().fold(0, |mask, flag| mask | flag.bit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_status_codes_round_trip() {
        for status in FileStatus::ALL {
            assert_eq!(FileStatus::from_code(status.code()).unwrap(), *status);
        }
    }

    #[test]
    fn test_unknown_file_status_is_rejected() {
        let err = FileStatus::from_code(11).unwrap_err();
        match err {
            CoreError::InvalidCode { field, code } => {
                assert_eq!(field, "filestatus");
                assert_eq!(code, 11);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transcode_quality_lookup() {
        assert_eq!(TranscodeQuality::try_from(3).unwrap(), TranscodeQuality::High);
        assert_eq!(Code::from(TranscodeQuality::Default), 0);
        assert!(TranscodeQuality::from_code(-1).is_err());
    }

    #[test]
    fn test_recording_type_partition() {
        assert_eq!(RecordingType::from_t_id(5), Some(RecordingType::Program));
        assert_eq!(RecordingType::from_t_id(0), Some(RecordingType::Epg));
        assert_eq!(RecordingType::from_t_id(-1), Some(RecordingType::Keyword));
        assert_eq!(RecordingType::from_t_id(-2), None);

        for t_id in [-1, 0, 1, 42] {
            let hits = [
                RecordingType::Program,
                RecordingType::Epg,
                RecordingType::Keyword,
            ]
            .iter()
            .filter(|rt| RecordingType::from_t_id(t_id) == Some(**rt))
            .count();
            assert_eq!(hits, 1, "tid {t_id} must fall into exactly one category");
        }
    }

    #[test]
    fn test_zero_mask_is_empty() {
        assert!(SyobocalFlag::from_bits(0).is_empty());
    }

    #[test]
    fn test_two_bits_decode_to_two_flags() {
        let flags = SyobocalFlag::from_bits(0x02 | 0x04);
        assert_eq!(
            flags.into_iter().collect::<Vec<_>>(),
            vec![SyobocalFlag::New, SyobocalFlag::Final]
        );
    }

    #[test]
    fn test_unknown_bits_are_dropped() {
        let flags = SyobocalFlag::from_bits(0x01 | 0x40);
        assert_eq!(flags.len(), 1);
        assert!(flags.contains(&SyobocalFlag::Attention));
        assert_eq!(SyobocalFlag::to_bits(&flags), 0x01);
    }
}
