use std::path::PathBuf;

use clap::Args;

use common::driver::FileStream;
use service::vfs_ops;

/// Upload a local file into a directory under an account.
#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Account name
    pub account: String,

    /// Local file to upload
    pub file: PathBuf,

    /// Virtual path of the destination directory
    #[arg(default_value = "/")]
    pub dest: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Setup(#[from] crate::op::OpSetupError),
    #[error("cannot read {}: {}", .0.display(), .1)]
    Read(PathBuf, std::io::Error),
    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),
    #[error("upload failed: {0}")]
    Failed(#[from] service::VfsOpsError),
}

#[async_trait::async_trait]
impl crate::op::Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::NoFileName(self.file.clone()))?;
        let meta = tokio::fs::metadata(&self.file)
            .await
            .map_err(|e| UploadError::Read(self.file.clone(), e))?;
        let file = tokio::fs::File::open(&self.file)
            .await
            .map_err(|e| UploadError::Read(self.file.clone(), e))?;
        let mime = mime_guess::from_path(&self.file)
            .first_or_octet_stream()
            .to_string();

        let stream = FileStream {
            name: name.clone(),
            parent_path: self.dest.clone(),
            mime,
            size: meta.len(),
            reader: Box::new(file),
        };

        let state = ctx.state().await?;
        let result = vfs_ops::upload_file(Some(stream), &self.account, &state).await;
        state.shutdown().await;

        result?;
        Ok(format!("uploaded {} to {}", name, self.dest))
    }
}
