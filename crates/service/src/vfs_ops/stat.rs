use common::file::FileEntity;

use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// Resolve a single virtual path to metadata.
pub async fn stat_file(
    path: &str,
    account_name: &str,
    state: &ServiceState,
) -> Result<FileEntity, VfsOpsError> {
    let (account, driver) = load_ready(account_name, state).await?;
    Ok(driver.file(path, &account).await?)
}
