use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    static ref BASE_VERSION: Regex = Regex::new(r"\d+\.\d+").unwrap();
}

/// Derives the version tag for a bulletin from its title and the number of
/// mid-patch amendments it carries.
///
/// The first `\d+\.\d+` substring of the title is the base version. With no
/// amendments the base is returned unchanged; with `n` amendments the letter
/// `char(b'a' + n)` is appended, so one amendment yields `b`, two yield `c`,
/// and so on. The suffix never advances past `z`.
pub fn resolve_patch_version(title: &str, amendment_count: usize) -> Result<String> {
    let base = BASE_VERSION
        .find(title)
        .ok_or_else(|| Error::VersionFormat(title.to_string()))?
        .as_str();

    if amendment_count == 0 {
        return Ok(base.to_string());
    }

    let letter = (b'a' + amendment_count.min(25) as u8) as char;
    Ok(format!("{base}{letter}"))
}

/// Total order over version strings such as `13.13b`.
///
/// Each string is split into maximal runs of digits and runs of non-digits.
/// Runs are compared index-wise: digit runs numerically, anything else as
/// raw strings. The first differing index decides; a string that runs out of
/// tokens first sorts before its extension, so `13.13 < 13.13b`.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let lhs = tokenize(left);
    let rhs = tokenize(right);

    for i in 0..lhs.len().max(rhs.len()) {
        match (lhs.get(i), rhs.get(i)) {
            (Some(a), Some(b)) => {
                let ord = match (a.parse::<u128>(), b.parse::<u128>()) {
                    (Ok(m), Ok(n)) => m.cmp(&n),
                    _ => a.cmp(b),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => break,
        }
    }

    Ordering::Equal
}

fn tokenize(version: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = version.as_bytes();
    let mut start = 0;

    for i in 1..=bytes.len() {
        if i == bytes.len()
            || bytes[i].is_ascii_digit() != bytes[start].is_ascii_digit()
        {
            tokens.push(&version[start..i]);
            start = i;
        }
    }

    tokens
}
