use common::vpath;

use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// Delete an entry and drop the listings that still mention it.
pub async fn delete_item(
    path: &str,
    account_name: &str,
    state: &ServiceState,
) -> Result<(), VfsOpsError> {
    let (account, driver) = load_ready(account_name, state).await?;
    let path = vpath::normalize(path);
    driver.delete(&path, &account).await?;
    let cache = state.cache();
    cache.invalidate(&vpath::parent_of(&path), &account);
    cache.invalidate(&path, &account);
    Ok(())
}
