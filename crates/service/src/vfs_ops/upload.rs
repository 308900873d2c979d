use common::driver::FileStream;
use common::error::DriverError;
use common::vpath;

use super::{load_ready, VfsOpsError};
use crate::ServiceState;

/// Upload a file stream into a directory.
///
/// A missing stream fails with `EmptyFile` before any backend call is made.
pub async fn upload_file(
    stream: Option<FileStream>,
    account_name: &str,
    state: &ServiceState,
) -> Result<(), VfsOpsError> {
    let stream = stream.ok_or(DriverError::EmptyFile)?;
    let parent_path = vpath::normalize(&stream.parent_path);
    let (account, driver) = load_ready(account_name, state).await?;
    driver.upload(Some(stream), &account).await?;
    state.cache().invalidate(&parent_path, &account);
    Ok(())
}
