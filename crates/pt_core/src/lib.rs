pub mod clock;
pub mod error;
pub mod snapshot;
pub mod types;
pub mod version;

pub use clock::{Clock, SystemClock};
pub use error::Error;
pub use snapshot::{should_persist, SnapshotStore};
pub use types::{ArticleSummary, PatchDescriptor};

pub type Result<T> = std::result::Result<T, Error>;
