use clap::Args;

use service::vfs_ops;

/// Rename an entry in place.
#[derive(Args, Debug, Clone)]
pub struct Rename {
    /// Account name
    pub account: String,

    /// Virtual path of the entry
    pub path: String,

    /// New name
    pub new_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("rename failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for Rename {
    type Error = RenameError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::rename_item(&self.path, &self.new_name, &self.account, &state).await;
        state.shutdown().await;

        result?;
        Ok(format!("renamed {} to {}", self.path, self.new_name))
    }
}
