use clap::Args;

use service::vfs_ops;

/// Delete an entry.
#[derive(Args, Debug, Clone)]
pub struct Rm {
    /// Account name
    pub account: String,

    /// Virtual path of the entry
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RmError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("delete failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for Rm {
    type Error = RmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::delete_item(&self.path, &self.account, &state).await;
        state.shutdown().await;

        result?;
        Ok(format!("deleted {}", self.path))
    }
}
