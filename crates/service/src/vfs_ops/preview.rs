use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// Driver-specific rich preview; `NotSupported` is a common, valid answer.
pub async fn preview_file(
    path: &str,
    account_name: &str,
    state: &ServiceState,
) -> Result<serde_json::Value, VfsOpsError> {
    let (account, driver) = load_ready(account_name, state).await?;
    Ok(driver.preview(path, &account).await?)
}
