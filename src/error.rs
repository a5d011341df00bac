use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("user not logged in")]
    NotAuthenticated,
    #[error("not found")]
    NotFound,
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, AppError::NotAuthenticated)
    }
}
