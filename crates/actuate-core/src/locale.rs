//! Locale preference and ordering.
//!
//! Ordering is a pure function over the set of locales a phrase exists in:
//! preferred locale (exact), then its language-only prefix, then `en`, then
//! everything else alphabetically. No OS locale API is consulted here;
//! [`preferred_locales`] only reads the conventional environment variables.

use std::collections::BTreeSet;

/// Environment variables consulted for the preferred locale, in order.
pub const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Locale used after the preferred ones.
pub const DEFAULT_LOCALE: &str = "en";

/// Normalize raw locale values such as `fr_FR.UTF-8` into `fr-FR`.
///
/// Empty values are skipped and duplicates removed, keeping first occurrence.
pub fn preferred_locales_from<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut locales: Vec<String> = Vec::new();
    for value in values {
        let base = value.as_ref().split('.').next().unwrap_or_default().trim();
        // "C" and "POSIX" carry no language preference.
        if base.is_empty() || base == "C" || base == "POSIX" {
            continue;
        }
        let locale = base.replace('_', "-");
        if !locales.contains(&locale) {
            locales.push(locale);
        }
    }
    locales
}

/// Preferred locales from the process environment.
pub fn preferred_locales() -> Vec<String> {
    preferred_locales_from(
        LOCALE_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok()),
    )
}

fn same_locale(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.chars()
            .zip(b.chars())
            .all(|(x, y)| normalize_char(x) == normalize_char(y))
}

fn normalize_char(c: char) -> char {
    if c == '_' { '-' } else { c.to_ascii_lowercase() }
}

fn language_of(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}

/// Order `available` locales by preference.
///
/// The result contains every distinct input locale exactly once.
pub fn order_locales<'a, I>(available: I, preferred: Option<&str>) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut remaining: BTreeSet<&'a str> = available.into_iter().collect();
    let mut ordered: Vec<&'a str> = Vec::with_capacity(remaining.len());

    let mut take = |wanted: &str, ordered: &mut Vec<&'a str>| {
        if let Some(found) = remaining.iter().copied().find(|l| same_locale(l, wanted)) {
            remaining.remove(found);
            ordered.push(found);
        }
    };

    if let Some(preferred) = preferred.map(str::trim).filter(|p| !p.is_empty()) {
        take(preferred, &mut ordered);
        let language = language_of(preferred);
        if language != preferred {
            take(language, &mut ordered);
        }
    }
    take(DEFAULT_LOCALE, &mut ordered);

    ordered.extend(remaining);
    ordered
}
