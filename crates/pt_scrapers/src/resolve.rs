use chrono::{DateTime, Datelike, FixedOffset, SecondsFormat, TimeZone, Utc};
use tracing::warn;

use pt_core::error::{Error, Result};
use pt_core::Clock;

use crate::rules::ScrapeRules;

/// Amendment headlines carry no year or time of day; the source publishes
/// them against a Pacific wall clock, pinned here to noon at a fixed UTC-8.
const AMENDMENT_UTC_OFFSET_HOURS: i32 = -8;
const AMENDMENT_WALL_CLOCK_HOUR: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTimestamps {
    /// ISO-8601: the latest amendment instant when amendments exist,
    /// otherwise the primary timestamp verbatim.
    pub timestamp: String,
    /// Primary bulletin timestamp, epoch milliseconds.
    pub epoch: i64,
    /// Latest amendment instant (or the clock's current instant when there
    /// are no amendments), epoch milliseconds.
    pub mid_patch_epoch: i64,
}

/// Normalizes the bulletin's timestamps.
///
/// `primary` must be an ISO-8601 instant; failing to parse it fails the
/// candidate. Amendment tokens are resolved one by one and a malformed token
/// is skipped with a warning rather than aborting resolution.
pub fn resolve_timestamps(
    primary: &str,
    amendment_dates: &[String],
    rules: &ScrapeRules,
    clock: &dyn Clock,
) -> Result<ResolvedTimestamps> {
    let epoch = DateTime::parse_from_rfc3339(primary)
        .map_err(|e| Error::Scraping(format!("unparsable primary timestamp {primary:?}: {e}")))?
        .timestamp_millis();

    let latest_amendment = latest_amendment_instant(amendment_dates, rules, clock);

    match latest_amendment {
        Some(instant) => Ok(ResolvedTimestamps {
            timestamp: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            epoch,
            mid_patch_epoch: instant.timestamp_millis(),
        }),
        None => Ok(ResolvedTimestamps {
            timestamp: primary.to_string(),
            epoch,
            mid_patch_epoch: clock.now().timestamp_millis(),
        }),
    }
}

fn latest_amendment_instant(
    amendment_dates: &[String],
    rules: &ScrapeRules,
    clock: &dyn Clock,
) -> Option<DateTime<Utc>> {
    if amendment_dates.is_empty() {
        return None;
    }

    let offset = FixedOffset::east_opt(AMENDMENT_UTC_OFFSET_HOURS * 3600)
        .expect("fixed offset is in range");
    let year = clock.now().with_timezone(&offset).year();

    let mut latest: Option<DateTime<Utc>> = None;
    for token in amendment_dates {
        match parse_amendment_token(token, year, offset, &rules.month_prefixes) {
            Ok(instant) => {
                latest = Some(match latest {
                    Some(current) => current.max(instant),
                    None => instant,
                });
            }
            Err(e) => warn!("skipping amendment date token: {e}"),
        }
    }

    if latest.is_none() {
        warn!("no amendment date token parsed, falling back to current instant");
    }
    latest
}

/// Parses `"<MONTH> <DAY><ordinal>[, trailing text]"` into the instant of
/// noon on that day at the fixed offset, expressed as UTC.
fn parse_amendment_token(
    token: &str,
    year: i32,
    offset: FixedOffset,
    month_prefixes: &[String],
) -> Result<DateTime<Utc>> {
    let mut words = token.trim().split_whitespace();

    let month_word = words
        .next()
        .ok_or_else(|| Error::DateToken(token.to_string()))?;
    let month = month_prefixes
        .iter()
        .position(|prefix| month_word.to_uppercase().starts_with(prefix.as_str()))
        .map(|index| index as u32 + 1)
        .ok_or_else(|| Error::DateToken(token.to_string()))?;

    let day_word = words
        .next()
        .ok_or_else(|| Error::DateToken(token.to_string()))?;
    let day: u32 = day_word
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .map_err(|_| Error::DateToken(token.to_string()))?;

    let local = offset
        .with_ymd_and_hms(year, month, day, AMENDMENT_WALL_CLOCK_HOUR, 0, 0)
        .single()
        .ok_or_else(|| Error::DateToken(token.to_string()))?;

    Ok(local.with_timezone(&Utc))
}
