use clap::Args;

use service::vfs_ops;

#[derive(Args, Debug, Clone)]
pub struct AccountRemove {
    /// Account name
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AccountRemoveError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("account removal failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for AccountRemove {
    type Error = AccountRemoveError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::delete_account(&self.name, &state).await;
        state.shutdown().await;

        result?;
        Ok(format!("account [{}] removed", self.name))
    }
}
