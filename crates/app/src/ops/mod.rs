pub mod account;
pub mod cp;
pub mod init;
pub mod link;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod rename;
pub mod rm;
pub mod stat;
pub mod upload;
pub mod version;

pub use account::Account;
pub use cp::Cp;
pub use init::Init;
pub use link::Link;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use mv::Mv;
pub use rename::Rename;
pub use rm::Rm;
pub use stat::Stat;
pub use upload::Upload;
pub use version::Version;
