use clap::Args;

use service::vfs_ops;

#[derive(Args, Debug, Clone)]
pub struct AccountList;

#[derive(Debug, thiserror::Error)]
pub enum AccountListError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("listing accounts failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for AccountList {
    type Error = AccountListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::list_accounts(&state).await;
        state.shutdown().await;

        let accounts = result?;
        if accounts.is_empty() {
            return Ok("no accounts configured".to_string());
        }
        let output = accounts
            .iter()
            .map(|account| {
                format!(
                    "{} ({}) [{}]",
                    account.name, account.driver, account.status
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(output)
    }
}
