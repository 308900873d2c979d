mod cache;
mod database;
mod registry;
mod resolve;
pub mod drivers;
pub mod testkit;
pub mod vfs_ops;

mod config;
mod state;

pub use cache::DirCache;
pub use config::Config as ServiceConfig;
pub use database::models::AccountStoreError;
pub use database::{Database, DatabaseSetupError};
pub use registry::DriverRegistry;
pub use resolve::Resolver;
pub use state::{State as ServiceState, StateSetupError as ServiceStateSetupError};
pub use vfs_ops::VfsOpsError;
