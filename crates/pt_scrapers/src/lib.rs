pub mod detail;
pub mod fetch;
pub mod listing;
pub mod manager;
pub mod resolve;
pub mod rules;

pub use fetch::{HttpFetcher, PageFetcher};
pub use manager::{PatchTracker, RunOutcome, WriteOutcome};
pub use rules::{ScrapeRules, TrackerConfig};

pub mod prelude {
    pub use super::fetch::PageFetcher;
    pub use super::manager::PatchTracker;
    pub use pt_core::{ArticleSummary, Error, PatchDescriptor, Result};
}
