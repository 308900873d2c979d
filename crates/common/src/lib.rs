pub mod account;
pub mod batch;
pub mod driver;
pub mod error;
pub mod file;
pub mod version;
pub mod vpath;

pub mod prelude {
    pub use crate::account::{Account, SortBy, SortDirection, WORKING_STATUS};
    pub use crate::batch::{BatchItem, BatchKind, BatchTask};
    pub use crate::driver::{
        DownloadLink, Driver, DriverConfig, FileStream, Item, ItemKind, LinkArgs, Lister,
        RawListing,
    };
    pub use crate::error::DriverError;
    pub use crate::file::{kind_for_name, sort_entities, FileEntity, FileKind};
    pub use crate::vpath;
}
