use common::vpath;

use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// Move an entry. On task-based drivers this returns once the batch task is
/// accepted; the stale listings are invalidated immediately anyway, trading
/// a briefly wrong view for responsiveness.
pub async fn move_item(
    src: &str,
    dst: &str,
    account_name: &str,
    state: &ServiceState,
) -> Result<(), VfsOpsError> {
    let (account, driver) = load_ready(account_name, state).await?;
    let src = vpath::normalize(src);
    let dst = vpath::normalize(dst);
    driver.move_item(&src, &dst, &account).await?;
    let cache = state.cache();
    cache.invalidate(&vpath::parent_of(&src), &account);
    cache.invalidate(&src, &account);
    cache.invalidate(&vpath::parent_of(&dst), &account);
    Ok(())
}
