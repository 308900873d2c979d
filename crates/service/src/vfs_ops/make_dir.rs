use common::vpath;

use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// Create a directory, then invalidate the parent listing that no longer
/// reflects it.
pub async fn make_dir(
    path: &str,
    account_name: &str,
    state: &ServiceState,
) -> Result<(), VfsOpsError> {
    let (account, driver) = load_ready(account_name, state).await?;
    let path = vpath::normalize(path);
    driver.make_dir(&path, &account).await?;
    state.cache().invalidate(&vpath::parent_of(&path), &account);
    Ok(())
}
