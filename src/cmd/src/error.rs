use std::result;

use common::error::CommonError;
use query::error::QueryError;
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;

pub type Result<T> = result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("BadRequest: {0}")]
    BadRequest(String),
    #[error("Config: {0:?}")]
    Config(#[from] ::config::ConfigError),
    #[error("StdIO: {0:?}")]
    StdIO(#[from] std::io::Error),
    #[error("Serde: {0:?}")]
    Serde(#[from] serde_json::Error),
    #[error("SetGlobalDefaultError: {0:?}")]
    SetGlobalDefaultError(SetGlobalDefaultError),
    #[error("common: {0:?}")]
    Common(#[from] CommonError),
    #[error("query: {0:?}")]
    Query(#[from] QueryError),
}
