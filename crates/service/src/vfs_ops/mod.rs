//! Public operation layer over accounts, drivers and the directory cache.
//!
//! Every operation loads the account, dispatches through the driver
//! registry, and — for mutations — invalidates the listings the mutation
//! staled. Drivers never touch the cache themselves.

mod accounts;
mod copy_item;
mod delete;
mod link;
mod list;
mod make_dir;
mod move_item;
mod preview;
mod rename;
mod stat;
mod upload;

mod error;

pub use accounts::{delete_account, get_account, list_accounts, save_account};
pub use copy_item::copy_item;
pub use delete::delete_item;
pub use error::VfsOpsError;
pub use link::resolve_link;
pub use list::list_files;
pub use make_dir::make_dir;
pub use move_item::move_item;
pub use preview::preview_file;
pub use rename::rename_item;
pub use stat::stat_file;
pub use upload::upload_file;

use std::sync::Arc;

use common::account::Account;
use common::driver::Driver;

use crate::database::models::account as account_model;
use crate::ServiceState;

/// Load an account that is safe to serve requests against, plus its driver.
pub(crate) async fn load_ready(
    account_name: &str,
    state: &ServiceState,
) -> Result<(Account, Arc<dyn Driver>), VfsOpsError> {
    let account = account_model::get_by_name(account_name, state.database())
        .await?
        .ok_or_else(|| VfsOpsError::AccountNotFound(account_name.to_string()))?;
    if !account.is_working() {
        return Err(VfsOpsError::AccountNotReady(
            account.name.clone(),
            account.status.clone(),
        ));
    }
    let driver = state
        .registry()
        .get(&account.driver)
        .ok_or_else(|| VfsOpsError::UnknownDriver(account.driver.clone()))?;
    Ok((account, driver))
}
