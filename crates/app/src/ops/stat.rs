use clap::Args;

use service::vfs_ops;

/// Resolve a virtual path to its metadata.
#[derive(Args, Debug, Clone)]
pub struct Stat {
    /// Account name
    pub account: String,

    /// Virtual path
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StatError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("stat failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for Stat {
    type Error = StatError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::stat_file(&self.path, &self.account, &state).await;
        state.shutdown().await;

        let entry = result?;
        let updated = entry
            .updated_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(format!(
            "name: {}\nkind: {:?}\nsize: {}\ndriver: {}\nupdated: {}",
            entry.name, entry.kind, entry.size, entry.driver, updated
        ))
    }
}
