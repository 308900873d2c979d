use common::file::FileEntity;

use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// List a directory's direct children under an account.
pub async fn list_files(
    path: &str,
    account_name: &str,
    state: &ServiceState,
) -> Result<Vec<FileEntity>, VfsOpsError> {
    let (account, driver) = load_ready(account_name, state).await?;
    Ok(driver.files(path, &account).await?)
}
