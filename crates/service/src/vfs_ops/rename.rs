use common::vpath;

use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// Rename an entry in place. Synchronous even on task-based drivers.
pub async fn rename_item(
    src: &str,
    dst: &str,
    account_name: &str,
    state: &ServiceState,
) -> Result<(), VfsOpsError> {
    let (account, driver) = load_ready(account_name, state).await?;
    let src = vpath::normalize(src);
    let dst = vpath::normalize(dst);
    driver.rename(&src, &dst, &account).await?;
    let cache = state.cache();
    cache.invalidate(&vpath::parent_of(&src), &account);
    cache.invalidate(&src, &account);
    Ok(())
}
