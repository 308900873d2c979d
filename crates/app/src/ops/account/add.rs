use clap::Args;

use common::account::{SortBy, SortDirection};
use service::vfs_ops;

/// Add or replace an account. The driver validates the credentials; a
/// failed validation is still recorded so `account list` shows it.
#[derive(Args, Debug, Clone)]
pub struct AccountAdd {
    /// Account name, unique across the store
    pub name: String,

    /// Driver this account is an instance of (e.g. local, 189cloud)
    #[arg(long)]
    pub driver: String,

    #[arg(long, default_value = "")]
    pub username: String,

    #[arg(long, default_value = "")]
    pub password: String,

    /// Root path or folder id inside the backend
    #[arg(long, default_value = "")]
    pub root_folder: String,

    /// Listing sort key: name, size or updated_at
    #[arg(long, default_value = "name")]
    pub sort_by: SortBy,

    /// Listing sort direction: asc or desc
    #[arg(long, default_value = "asc")]
    pub sort_direction: SortDirection,
}

#[derive(Debug, thiserror::Error)]
pub enum AccountAddError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("account save failed: {0}")]
    Save(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for AccountAdd {
    type Error = AccountAddError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let account = common::account::Account {
            name: self.name.clone(),
            driver: self.driver.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            root_folder: self.root_folder.clone(),
            status: String::new(),
            drive_id: String::new(),
            proxy: false,
            sort_by: self.sort_by,
            sort_direction: self.sort_direction,
            updated_at: None,
        };

        let state = ctx.state().await?;
        let result = vfs_ops::save_account(account, &state).await;
        state.shutdown().await;

        let saved = result?;
        Ok(format!(
            "account [{}] saved (driver: {}, status: {})",
            saved.name, saved.driver, saved.status
        ))
    }
}
