use serde::{Deserialize, Serialize};

/// One entry discovered on a listing page, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub title: String,
    /// ISO-8601 publication timestamp as found on the page, or empty.
    pub published_at: String,
    /// Absolute URL, or empty when the listing entry carried no link.
    pub url: String,
}

/// The normalized record of one published bulletin version.
///
/// Serialized field names match the persisted snapshot format
/// (`midPatchEpoch`, `midPatchUpdateDates`, `patchVersion`); readers must
/// tolerate additive fields, so unknown keys are ignored and missing ones
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatchDescriptor {
    pub title: String,
    pub url: String,
    /// ISO-8601. The latest amendment instant when amendments exist,
    /// otherwise the bulletin's primary timestamp.
    pub timestamp: String,
    /// Primary bulletin timestamp, epoch milliseconds.
    pub epoch: i64,
    /// Latest amendment instant, epoch milliseconds. Derived independently
    /// of `epoch`; not guaranteed to be >= `epoch`.
    pub mid_patch_epoch: i64,
    /// Raw amendment headlines, most recent first.
    pub mid_patch_update_dates: Vec<String>,
    /// Version tag matching `\d+\.\d+[a-z]?`.
    pub patch_version: String,
}

impl Default for PatchDescriptor {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            timestamp: String::new(),
            epoch: 0,
            mid_patch_epoch: 0,
            mid_patch_update_dates: Vec::new(),
            patch_version: String::new(),
        }
    }
}
