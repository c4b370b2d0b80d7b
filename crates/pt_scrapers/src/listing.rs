use chrono::DateTime;
use scraper::{Html, Selector};
use url::Url;

use pt_core::ArticleSummary;

/// Extracts one summary per `<li>` of a listing page, in document order.
///
/// Nothing is dropped here: entries with no heading, no timestamp or no link
/// come through with empty strings so the caller can see everything the page
/// offered.
pub fn list_articles(document: &Html, site_origin: &str) -> Vec<ArticleSummary> {
    let item_selector = Selector::parse("li").unwrap();
    let title_selector = Selector::parse("h2").unwrap();
    let time_selector = Selector::parse("time").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let origin = Url::parse(site_origin).ok();

    document
        .select(&item_selector)
        .map(|item| {
            let title = item
                .select(&title_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            let published_at = item
                .select(&time_selector)
                .next()
                .and_then(|el| el.value().attr("datetime"))
                .unwrap_or_default()
                .to_string();

            let url = item
                .select(&link_selector)
                .next()
                .and_then(|el| el.value().attr("href"))
                .map(|href| resolve_href(origin.as_ref(), href))
                .unwrap_or_default();

            ArticleSummary {
                title,
                published_at,
                url,
            }
        })
        .collect()
}

fn resolve_href(origin: Option<&Url>, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    match origin.and_then(|base| base.join(href).ok()) {
        Some(absolute) => absolute.to_string(),
        None => href.to_string(),
    }
}

/// Keeps the summaries whose title contains every required keyword phrase
/// (case-insensitively) and ranks them most recent first. Entries whose
/// `published_at` does not parse sort as oldest.
///
/// The head of the result is the "single most recent candidate" view; the
/// whole list feeds version reconciliation across listing sources.
pub fn filter_rank(articles: Vec<ArticleSummary>, required_keywords: &[String]) -> Vec<ArticleSummary> {
    let mut kept: Vec<ArticleSummary> = articles
        .into_iter()
        .filter(|article| {
            let title = article.title.to_lowercase();
            required_keywords
                .iter()
                .all(|keyword| title.contains(&keyword.to_lowercase()))
        })
        .collect();

    kept.sort_by(|a, b| {
        let a_time = DateTime::parse_from_rfc3339(&a.published_at).ok();
        let b_time = DateTime::parse_from_rfc3339(&b.published_at).ok();
        match (a_time, b_time) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });

    kept
}
