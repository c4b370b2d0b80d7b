use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::rules::ScrapeRules;

/// True iff the detail page carries an amendment section, i.e. any `<h2>`
/// whose text contains one of the marker phrases.
pub fn has_mid_patch_updates(document: &Html, rules: &ScrapeRules) -> bool {
    find_marker_heading(document, rules).is_some()
}

/// The page's primary publication timestamp: the `datetime` attribute of the
/// first `<time>` element, if any.
pub fn primary_timestamp(document: &Html) -> Option<String> {
    let time_selector = Selector::parse("time").unwrap();
    document
        .select(&time_selector)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .map(|datetime| datetime.to_string())
}

/// Collects the dated amendment headlines under the mid-patch section.
///
/// The walk starts at the sibling after the marker heading's enclosing
/// `<header>` and visits siblings in document order until it runs out, hits
/// the `<header>` of an unrelated section, or exhausts the defensive sibling
/// budget. Within each sibling only the first `<h4>` whose trimmed text
/// starts with a month abbreviation is recorded, in full.
///
/// Document order is the order the source publishes amendments in: index 0
/// is the latest amendment headline.
pub fn mid_patch_update_dates(document: &Html, rules: &ScrapeRules) -> Vec<String> {
    let sub_heading_selector = Selector::parse("h4").unwrap();

    let Some(marker) = find_marker_heading(document, rules) else {
        return Vec::new();
    };

    // The walk anchors on the heading's enclosing header block; a marker
    // heading outside one has no section to scan.
    let Some(header_block) = marker
        .parent()
        .and_then(ElementRef::wrap)
        .filter(|parent| parent.value().name() == "header")
    else {
        return Vec::new();
    };

    let mut dates = Vec::new();
    let mut visited = 0usize;
    let mut node = header_block.next_sibling();

    while let Some(current) = node {
        if let Some(sibling) = ElementRef::wrap(current) {
            if sibling.value().name() == "header" {
                break;
            }

            visited += 1;
            if visited > rules.max_siblings {
                warn!(
                    max_siblings = rules.max_siblings,
                    "amendment walk exceeded sibling budget, stopping"
                );
                break;
            }

            let dated = sibling.select(&sub_heading_selector).find_map(|heading| {
                let text = heading.text().collect::<String>();
                let trimmed = text.trim();
                rules
                    .month_prefixes
                    .iter()
                    .any(|month| trimmed.starts_with(month.as_str()))
                    .then(|| trimmed.to_string())
            });
            if let Some(date) = dated {
                dates.push(date);
            }
        }
        node = current.next_sibling();
    }

    dates
}

fn find_marker_heading<'a>(document: &'a Html, rules: &ScrapeRules) -> Option<ElementRef<'a>> {
    let heading_selector = Selector::parse("h2").unwrap();
    document.select(&heading_selector).find(|heading| {
        let text = heading.text().collect::<String>();
        rules
            .marker_phrases
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
    })
}
