use std::result;

use common::error::CommonError;
use thiserror::Error;

pub type Result<T> = result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("bad request {0:?}")]
    BadRequest(String),
    #[error("common {0:?}")]
    Common(#[from] CommonError),
}
