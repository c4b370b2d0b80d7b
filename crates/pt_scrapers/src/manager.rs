use std::cmp::Ordering;
use std::sync::Arc;

use futures::future::join_all;
use scraper::Html;
use tracing::{error, info, warn};

use pt_core::version::{compare_versions, resolve_patch_version};
use pt_core::{
    should_persist, ArticleSummary, Clock, Error, PatchDescriptor, Result, SnapshotStore,
};

use crate::detail;
use crate::fetch::PageFetcher;
use crate::listing;
use crate::resolve;
use crate::rules::TrackerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The snapshot was replaced with the new descriptor.
    Written,
    /// The descriptor matches the snapshot; nothing was written.
    Unchanged,
    /// The descriptor superseded the snapshot but the write failed. The
    /// computed result is still valid; only durability is affected.
    WriteFailed(String),
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub descriptor: PatchDescriptor,
    pub write: WriteOutcome,
}

/// Drives one tracking run: discover the current bulletin across the
/// configured listing sources, build a descriptor per candidate detail page,
/// keep the maximal version, and persist it when it supersedes the snapshot.
pub struct PatchTracker {
    fetcher: Arc<dyn PageFetcher>,
    storage: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    config: TrackerConfig,
}

impl PatchTracker {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        storage: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            fetcher,
            storage,
            clock,
            config,
        }
    }

    pub async fn run_once(&self) -> Result<RunOutcome> {
        let candidates = self.select_candidates().await?;
        info!("🔎 {} candidate detail page(s)", candidates.len());

        let pipelines: Vec<_> = candidates
            .iter()
            .map(|candidate| self.build_descriptor(candidate))
            .collect();
        let results = join_all(pipelines).await;

        // A failed pipeline drops its candidate; the run only fails when no
        // candidate survives.
        let mut descriptors = Vec::new();
        let mut first_error = None;
        for (candidate, result) in candidates.iter().zip(results) {
            match result {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(e) => {
                    warn!("candidate pipeline failed for {}: {}", candidate.url, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        let mut best: Option<PatchDescriptor> = None;
        for descriptor in descriptors {
            best = Some(match best {
                None => descriptor,
                // Earlier candidates win ties, so the primary site's
                // descriptor is preferred over a mirror's.
                Some(current) => {
                    if compare_versions(&descriptor.patch_version, &current.patch_version)
                        == Ordering::Greater
                    {
                        descriptor
                    } else {
                        current
                    }
                }
            });
        }
        let best = best.ok_or_else(|| {
            first_error
                .unwrap_or_else(|| Error::Scraping("no candidate pipeline survived".to_string()))
        })?;
        info!(
            "🏷️ resolved {} ({} amendment(s))",
            best.patch_version,
            best.mid_patch_update_dates.len()
        );

        let existing = match self.storage.read().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("snapshot read failed, treating as absent: {e}");
                None
            }
        };

        let write = if should_persist(&best, existing.as_ref()) {
            match self.storage.write(&best).await {
                Ok(()) => {
                    info!("💾 snapshot updated to {}", best.patch_version);
                    WriteOutcome::Written
                }
                Err(e) => {
                    error!("snapshot write failed: {e}");
                    WriteOutcome::WriteFailed(e.to_string())
                }
            }
        } else {
            info!("⏭️ snapshot already at {}, skipping write", best.patch_version);
            WriteOutcome::Unchanged
        };

        Ok(RunOutcome {
            descriptor: best,
            write,
        })
    }

    /// The most recent matching bulletin from each listing source, expanded
    /// with its mirror URLs and deduplicated. A listing source that fails is
    /// skipped; all of them failing fails the run.
    async fn select_candidates(&self) -> Result<Vec<ArticleSummary>> {
        let rules = &self.config.rules;
        let mut selected: Vec<ArticleSummary> = Vec::new();
        let mut last_error = None;

        for listing_url in &self.config.listing_urls {
            match self.fetch_listing(listing_url).await {
                Ok(articles) => {
                    let ranked = listing::filter_rank(articles, &rules.required_keywords);
                    match ranked.into_iter().next() {
                        Some(top) if !top.url.is_empty() => {
                            for url in mirror_urls(&top.url, &self.config.mirror_rewrites) {
                                if !selected.iter().any(|c| c.url == url) {
                                    selected.push(ArticleSummary {
                                        url,
                                        ..top.clone()
                                    });
                                }
                            }
                        }
                        Some(top) => {
                            warn!("top bulletin {:?} on {listing_url} has no URL", top.title)
                        }
                        None => warn!("no bulletin matched keywords on {listing_url}"),
                    }
                }
                Err(e) => {
                    warn!("listing fetch failed for {listing_url}: {e}");
                    last_error = Some(e);
                }
            }
        }

        if selected.is_empty() {
            return Err(last_error.unwrap_or_else(|| {
                Error::Scraping("no bulletin matched the required keywords".to_string())
            }));
        }
        Ok(selected)
    }

    async fn fetch_listing(&self, url: &str) -> Result<Vec<ArticleSummary>> {
        let rules = &self.config.rules;
        let html = self
            .fetcher
            .fetch_rendered(url, &rules.content_ready_selector)
            .await?;
        let document = Html::parse_document(&html);
        Ok(listing::list_articles(&document, &rules.site_origin))
    }

    /// One candidate pipeline: fetch the detail page once, run every pure
    /// extraction over the parsed tree, then resolve timestamps and version.
    pub async fn build_descriptor(&self, candidate: &ArticleSummary) -> Result<PatchDescriptor> {
        let rules = &self.config.rules;
        let html = self.fetcher.fetch_page(&candidate.url).await?;

        let (amendment_dates, primary) = {
            let document = Html::parse_document(&html);
            let dates = if detail::has_mid_patch_updates(&document, rules) {
                detail::mid_patch_update_dates(&document, rules)
            } else {
                Vec::new()
            };
            (dates, detail::primary_timestamp(&document))
        };

        let primary = match primary {
            Some(timestamp) => timestamp,
            None if !candidate.published_at.is_empty() => candidate.published_at.clone(),
            None => {
                return Err(Error::Scraping(format!(
                    "no primary timestamp for {}",
                    candidate.url
                )))
            }
        };

        let resolved =
            resolve::resolve_timestamps(&primary, &amendment_dates, rules, self.clock.as_ref())?;
        let patch_version = resolve_patch_version(&candidate.title, amendment_dates.len())?;

        Ok(PatchDescriptor {
            title: candidate.title.clone(),
            url: candidate.url.clone(),
            timestamp: resolved.timestamp,
            epoch: resolved.epoch,
            mid_patch_epoch: resolved.mid_patch_epoch,
            mid_patch_update_dates: amendment_dates,
            patch_version,
        })
    }
}

fn mirror_urls(url: &str, rewrites: &[(String, String)]) -> Vec<String> {
    let mut urls = vec![url.to_string()];
    for (from, to) in rewrites {
        if url.starts_with(from.as_str()) {
            let mirrored = url.replacen(from.as_str(), to.as_str(), 1);
            if !urls.contains(&mirrored) {
                urls.push(mirrored);
            }
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::PageFetcher;
    use crate::rules::{ScrapeRules, TrackerConfig};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use pt_storage::MemoryStorage;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    struct FixedClock(chrono::DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> chrono::DateTime<Utc> {
            self.0
        }
    }

    struct FixtureFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Fetch(format!("no fixture for {url}")))
        }
    }

    struct CountingStore {
        inner: MemoryStorage,
        writes: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MemoryStorage::new(),
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SnapshotStore for CountingStore {
        async fn read(&self) -> Result<Option<PatchDescriptor>> {
            self.inner.read().await
        }

        async fn write(&self, descriptor: &PatchDescriptor) -> Result<()> {
            self.writes.fetch_add(1, AtomicOrdering::SeqCst);
            self.inner.write(descriptor).await
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn read(&self) -> Result<Option<PatchDescriptor>> {
            Ok(None)
        }

        async fn write(&self, _descriptor: &PatchDescriptor) -> Result<()> {
            Err(Error::Storage("disk full".to_string()))
        }
    }

    const LISTING_URL: &str = "https://www.example.com/news/tags/patch-notes/";
    const WWW_DETAIL: &str = "https://www.example.com/news/patch-13-14-notes/";
    const MIRROR_DETAIL: &str = "https://mirror.example.com/news/patch-13-14-notes/";

    fn listing_page() -> String {
        r#"
            <li>
                <a href="/news/patch-13-14-notes/">
                    <h2>Teamfight Tactics patch 13.14 notes</h2>
                    <time datetime="2023-07-18T17:00:00.000Z">7/18/2023</time>
                </a>
            </li>
        "#
        .to_string()
    }

    fn plain_detail_page() -> String {
        r#"
            <article>
                <time datetime="2023-07-18T17:00:00.000Z">7/18/2023</time>
                <header><h2>Patch Highlights</h2></header>
            </article>
        "#
        .to_string()
    }

    fn amended_detail_page() -> String {
        r#"
            <article>
                <time datetime="2023-07-18T17:00:00.000Z">7/18/2023</time>
                <header><h2>Mid-Patch Updates</h2></header>
                <div><h4>JULY 25TH, BALANCE CHANGES</h4></div>
                <header><h2>Patch Highlights</h2></header>
            </article>
        "#
        .to_string()
    }

    fn config() -> TrackerConfig {
        TrackerConfig {
            listing_urls: vec![LISTING_URL.to_string()],
            mirror_rewrites: vec![(
                "https://www.".to_string(),
                "https://mirror.".to_string(),
            )],
            rules: ScrapeRules {
                site_origin: "https://www.example.com".to_string(),
                ..ScrapeRules::default()
            },
        }
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2023, 7, 26, 9, 0, 0).unwrap(),
        ))
    }

    fn tracker_with(
        pages: Vec<(&str, String)>,
        storage: Arc<dyn SnapshotStore>,
    ) -> PatchTracker {
        let pages = pages
            .into_iter()
            .map(|(url, body)| (url.to_string(), body))
            .collect();
        PatchTracker::new(
            Arc::new(FixtureFetcher { pages }),
            storage,
            clock(),
            config(),
        )
    }

    #[tokio::test]
    async fn mirror_with_amendment_supersedes_primary() {
        let storage = Arc::new(CountingStore::new());
        let tracker = tracker_with(
            vec![
                (LISTING_URL, listing_page()),
                (WWW_DETAIL, plain_detail_page()),
                (MIRROR_DETAIL, amended_detail_page()),
            ],
            storage.clone(),
        );

        let outcome = tracker.run_once().await.unwrap();
        assert_eq!(outcome.descriptor.patch_version, "13.14b");
        assert_eq!(outcome.descriptor.url, MIRROR_DETAIL);
        assert_eq!(
            outcome.descriptor.mid_patch_update_dates,
            vec!["JULY 25TH, BALANCE CHANGES".to_string()]
        );
        assert_eq!(outcome.descriptor.timestamp, "2023-07-25T20:00:00.000Z");
        assert_eq!(outcome.write, WriteOutcome::Written);
    }

    #[tokio::test]
    async fn primary_wins_version_ties() {
        let storage = Arc::new(CountingStore::new());
        let tracker = tracker_with(
            vec![
                (LISTING_URL, listing_page()),
                (WWW_DETAIL, plain_detail_page()),
                (MIRROR_DETAIL, plain_detail_page()),
            ],
            storage.clone(),
        );

        let outcome = tracker.run_once().await.unwrap();
        assert_eq!(outcome.descriptor.patch_version, "13.14");
        assert_eq!(outcome.descriptor.url, WWW_DETAIL);
    }

    #[tokio::test]
    async fn second_run_over_unchanged_content_writes_nothing() {
        let storage = Arc::new(CountingStore::new());
        let tracker = tracker_with(
            vec![
                (LISTING_URL, listing_page()),
                (WWW_DETAIL, plain_detail_page()),
                (MIRROR_DETAIL, amended_detail_page()),
            ],
            storage.clone(),
        );

        let first = tracker.run_once().await.unwrap();
        let second = tracker.run_once().await.unwrap();

        assert_eq!(first.descriptor, second.descriptor);
        assert_eq!(first.write, WriteOutcome::Written);
        assert_eq!(second.write, WriteOutcome::Unchanged);
        assert_eq!(storage.writes.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_mirror_pipeline_degrades_to_survivors() {
        let storage = Arc::new(CountingStore::new());
        let tracker = tracker_with(
            vec![
                (LISTING_URL, listing_page()),
                (WWW_DETAIL, plain_detail_page()),
                // No fixture for the mirror: its fetch fails.
            ],
            storage.clone(),
        );

        let outcome = tracker.run_once().await.unwrap();
        assert_eq!(outcome.descriptor.url, WWW_DETAIL);
        assert_eq!(outcome.write, WriteOutcome::Written);
    }

    #[tokio::test]
    async fn run_fails_when_no_pipeline_survives() {
        let storage = Arc::new(CountingStore::new());
        let tracker = tracker_with(vec![(LISTING_URL, listing_page())], storage);

        let err = tracker.run_once().await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[tokio::test]
    async fn run_fails_when_every_listing_source_fails() {
        let storage = Arc::new(CountingStore::new());
        let tracker = tracker_with(vec![], storage);

        assert!(tracker.run_once().await.is_err());
    }

    #[tokio::test]
    async fn write_failure_is_reported_not_fatal() {
        let tracker = tracker_with(
            vec![
                (LISTING_URL, listing_page()),
                (WWW_DETAIL, plain_detail_page()),
                (MIRROR_DETAIL, plain_detail_page()),
            ],
            Arc::new(FailingStore),
        );

        let outcome = tracker.run_once().await.unwrap();
        assert_eq!(outcome.descriptor.patch_version, "13.14");
        assert!(matches!(outcome.write, WriteOutcome::WriteFailed(_)));
    }

    #[test]
    fn mirror_urls_rewrite_and_dedup() {
        let rewrites = vec![("https://www.".to_string(), "https://mirror.".to_string())];
        assert_eq!(
            mirror_urls("https://www.example.com/a", &rewrites),
            vec![
                "https://www.example.com/a".to_string(),
                "https://mirror.example.com/a".to_string(),
            ]
        );
        // A URL the rewrite does not apply to stays alone.
        assert_eq!(
            mirror_urls("https://other.example.com/a", &rewrites).len(),
            1
        );
    }
}
