use clap::Args;

use service::vfs_ops;

/// Move an entry to a new path. Task-based backends acknowledge the batch
/// submission; the vendor finishes the move on its own time.
#[derive(Args, Debug, Clone)]
pub struct Mv {
    /// Account name
    pub account: String,

    /// Source virtual path
    pub src: String,

    /// Full destination virtual path
    pub dst: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MvError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("move failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for Mv {
    type Error = MvError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::move_item(&self.src, &self.dst, &self.account, &state).await;
        state.shutdown().await;

        result?;
        Ok(format!("moved {} -> {}", self.src, self.dst))
    }
}
