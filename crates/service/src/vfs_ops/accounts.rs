use common::account::Account;

use super::VfsOpsError;
use crate::database::models::account as account_model;
use crate::database::models::AccountStoreError;
use crate::ServiceState;

/// Validate and persist an account.
///
/// The driver performs the validation (a login where applicable) and writes
/// the outcome into `account.status`; the record is persisted either way so
/// a later `account list` shows the failure, and the error is also returned
/// to the caller. Listings cached under the account's previous identity are
/// wiped.
pub async fn save_account(
    mut account: Account,
    state: &ServiceState,
) -> Result<Account, VfsOpsError> {
    let driver = state
        .registry()
        .get(&account.driver)
        .ok_or_else(|| VfsOpsError::UnknownDriver(account.driver.clone()))?;
    let old = account_model::get_by_name(&account.name, state.database()).await?;

    let validation = driver.save(&mut account, old.as_ref()).await;
    // Dual-channel reporting: status is persisted whether or not validation
    // failed, and the failure still propagates.
    account_model::create_or_update(&account, state.database()).await?;
    state.cache().invalidate_account(&account.name);

    match validation {
        Ok(()) => {
            tracing::info!(account = %account.name, driver = %account.driver, "account saved");
            Ok(account)
        }
        Err(err) => {
            tracing::warn!(account = %account.name, error = %err, "account validation failed");
            Err(err.into())
        }
    }
}

pub async fn delete_account(name: &str, state: &ServiceState) -> Result<(), VfsOpsError> {
    account_model::delete_by_name(name, state.database())
        .await
        .map_err(|err| match err {
            AccountStoreError::NotFound(name) => VfsOpsError::AccountNotFound(name),
            other => other.into(),
        })?;
    state.cache().invalidate_account(name);
    tracing::info!(account = name, "account deleted");
    Ok(())
}

pub async fn get_account(name: &str, state: &ServiceState) -> Result<Account, VfsOpsError> {
    account_model::get_by_name(name, state.database())
        .await?
        .ok_or_else(|| VfsOpsError::AccountNotFound(name.to_string()))
}

pub async fn list_accounts(state: &ServiceState) -> Result<Vec<Account>, VfsOpsError> {
    Ok(account_model::list_all(state.database()).await?)
}
