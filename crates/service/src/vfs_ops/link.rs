use common::driver::{DownloadLink, LinkArgs};

use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// Resolve a downloadable location for a leaf entry.
///
/// Directories fail with `NotFile`; drivers without direct links answer
/// `NotSupported` and the delivery layer falls back to proxied streaming.
pub async fn resolve_link(
    path: &str,
    account_name: &str,
    state: &ServiceState,
) -> Result<DownloadLink, VfsOpsError> {
    let (account, driver) = load_ready(account_name, state).await?;
    let args = LinkArgs {
        path: path.to_string(),
    };
    Ok(driver.link(&args, &account).await?)
}
