/// Extraction constants, overridable in tests.
#[derive(Debug, Clone)]
pub struct ScrapeRules {
    /// Origin that relative listing links resolve against.
    pub site_origin: String,
    /// Phrases whose presence in an `<h2>` marks the amendment section.
    pub marker_phrases: Vec<String>,
    /// Month abbreviations a dated amendment headline must start with.
    pub month_prefixes: Vec<String>,
    /// Keyword phrases a bulletin title must all contain (case-insensitive)
    /// to survive filtering.
    pub required_keywords: Vec<String>,
    /// Selector the listing page's content grid must satisfy before the
    /// markup is considered loaded.
    pub content_ready_selector: String,
    /// Upper bound on the amendment sibling walk, against malformed trees.
    pub max_siblings: usize,
}

impl Default for ScrapeRules {
    fn default() -> Self {
        Self {
            site_origin: "https://www.leagueoflegends.com".to_string(),
            marker_phrases: vec![
                "Mid-Patch Updates".to_string(),
                "Mid-Patch Update".to_string(),
            ],
            month_prefixes: [
                "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT",
                "NOV", "DEC",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
            required_keywords: vec!["patch".to_string(), "notes".to_string()],
            content_ready_selector: "li".to_string(),
            max_siblings: 64,
        }
    }
}

/// Run-level configuration for the tracker pipeline.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Listing pages to discover bulletins on.
    pub listing_urls: Vec<String>,
    /// Prefix rewrites that derive mirror detail URLs from a candidate URL,
    /// e.g. the www site mirrored under a game-specific host.
    pub mirror_rewrites: Vec<(String, String)>,
    pub rules: ScrapeRules,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            listing_urls: vec![
                "https://www.leagueoflegends.com/en-us/news/tags/teamfight-tactics-patch-notes/"
                    .to_string(),
            ],
            mirror_rewrites: vec![(
                "https://www.".to_string(),
                "https://teamfighttactics.".to_string(),
            )],
            rules: ScrapeRules::default(),
        }
    }
}
