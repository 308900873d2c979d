use common::vpath;

use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// Copy an entry to a new location; only the destination parent listing goes
/// stale.
pub async fn copy_item(
    src: &str,
    dst: &str,
    account_name: &str,
    state: &ServiceState,
) -> Result<(), VfsOpsError> {
    let (account, driver) = load_ready(account_name, state).await?;
    let src = vpath::normalize(src);
    let dst = vpath::normalize(dst);
    driver.copy_item(&src, &dst, &account).await?;
    state.cache().invalidate(&vpath::parent_of(&dst), &account);
    Ok(())
}
