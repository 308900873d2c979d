use clap::Args;

use common::file::FileKind;
use service::vfs_ops;

/// List a directory under an account.
#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Account name
    pub account: String,

    /// Virtual path of the directory
    #[arg(default_value = "/")]
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("ls failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().await?;
        let result = vfs_ops::list_files(&self.path, &self.account, &state).await;
        state.shutdown().await;

        let entries = result?;
        if entries.is_empty() {
            return Ok("empty directory".to_string());
        }
        let output = entries
            .iter()
            .map(|entry| {
                let marker = if entry.kind == FileKind::Folder { "d" } else { "-" };
                format!("{} {:>12}  {}", marker, entry.size, entry.name)
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(output)
    }
}
