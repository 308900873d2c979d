use clap::Args;

use service::vfs_ops;

/// Create a directory.
#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    /// Account name
    pub account: String,

    /// Virtual path of the directory to create
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MkdirError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("mkdir failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for Mkdir {
    type Error = MkdirError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::make_dir(&self.path, &self.account, &state).await;
        state.shutdown().await;

        result?;
        Ok(format!("created {}", self.path))
    }
}
