use std::path::PathBuf;

pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "vdrive")]
#[command(about = "One namespace over many storage backends")]
pub struct Args {
    /// Data directory (default: ~/.vdrive)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
