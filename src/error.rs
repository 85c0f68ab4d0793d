use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write `{stored_name}`: {source}")]
    StorageWriteError {
        stored_name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("submission {0} not found")]
    NotFound(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("unknown submission status `{0}`")]
    UnknownStatus(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("mail transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to compose message: {0}")]
    Compose(String),

    #[error("notification task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
