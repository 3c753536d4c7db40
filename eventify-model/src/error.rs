use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown sort field '{0}'")]
    UnknownSortField(String),
}
