#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A stored coded column holds a value outside its closed set.
    #[error("Invalid code for {field}: {code}")]
    InvalidCode { field: &'static str, code: i64 },
}
