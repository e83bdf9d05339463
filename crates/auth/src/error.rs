#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} is not configured")]
    MissingSecret(&'static str),
    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("failed to hash password: {0}")]
    Hash(String),
}

pub type Result<T> = std::result::Result<T, Error>;
