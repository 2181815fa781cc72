/// All catalog primary keys are PostgreSQL BIGINT.
pub type DbId = i64;

/// All stored timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Broadcast schedule times carry no zone; foltia stores them as local wall-clock values.
pub type BroadcastTime = chrono::NaiveDateTime;
