#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("search term must not be empty")]
    EmptyTerm,

    #[error("invalid search term {term:?}: {message}")]
    InvalidTerm { term: String, message: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),
}

impl StoreError {
    /// True for errors caused by the caller's input rather than the store.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, StoreError::EmptyTerm | StoreError::InvalidTerm { .. })
    }

    /// Classifies an error raised while running a `MATCH` query. The
    /// statement itself is fixed, so a plain SQLITE_ERROR can only come from
    /// the full-text query parser rejecting the term.
    pub(crate) fn from_match(term: &str, err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == rusqlite::ErrorCode::Unknown =>
            {
                StoreError::InvalidTerm {
                    term: term.to_string(),
                    message: message.unwrap_or_else(|| failure.to_string()),
                }
            }
            err => err.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
