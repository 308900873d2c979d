use clap::Args;

use common::driver::DownloadLink;
use service::vfs_ops;

/// Resolve a download location for a file.
#[derive(Args, Debug, Clone)]
pub struct Link {
    /// Account name
    pub account: String,

    /// Virtual path of the file
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("link resolution failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for Link {
    type Error = LinkError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::resolve_link(&self.path, &self.account, &state).await;
        state.shutdown().await;

        Ok(match result? {
            DownloadLink::Url(url) => url,
            DownloadLink::Local(path) => path.display().to_string(),
        })
    }
}
