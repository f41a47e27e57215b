use thiserror::Error;

use crate::model::ModelError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("no form is open")]
    NoOpenForm,
    #[error("no delete is awaiting confirmation")]
    NothingToConfirm,
    #[error("task {0} is not in the current list")]
    UnknownTask(String),
    #[error(transparent)]
    Invalid(#[from] ModelError),
}
