mod args;
mod op;
mod ops;
mod state;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{
    Account, Cp, Init, Link, Ls, Mkdir, Mv, Rename, Rm, Stat, Upload, Version,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

command_enum! {
    (Init, Init),
    (Account, Account),
    (Ls, Ls),
    (Stat, Stat),
    (Link, Link),
    (Mkdir, Mkdir),
    (Mv, Mv),
    (Cp, Cp),
    (Rename, Rename),
    (Rm, Rm),
    (Upload, Upload),
    (Version, Version),
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();
    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);
    tracing_subscriber::registry().with(stderr_layer).init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing();

    let ctx = op::OpContext::new(args.data_dir.clone());
    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
