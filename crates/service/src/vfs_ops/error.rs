use common::error::DriverError;

use crate::database::models::AccountStoreError;

#[derive(Debug, thiserror::Error)]
pub enum VfsOpsError {
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("account [{0}] is not ready: {1}")]
    AccountNotReady(String, String),
    #[error("unknown driver: {0}")]
    UnknownDriver(String),
    #[error("account store error: {0}")]
    Store(#[from] AccountStoreError),
    #[error(transparent)]
    Driver(#[from] DriverError),
}
