use clap::Args;

use service::vfs_ops;

/// Copy an entry to a new path.
#[derive(Args, Debug, Clone)]
pub struct Cp {
    /// Account name
    pub account: String,

    /// Source virtual path
    pub src: String,

    /// Full destination virtual path
    pub dst: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CpError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("copy failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for Cp {
    type Error = CpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::copy_item(&self.src, &self.dst, &self.account, &state).await;
        state.shutdown().await;

        result?;
        Ok(format!("copied {} -> {}", self.src, self.dst))
    }
}
