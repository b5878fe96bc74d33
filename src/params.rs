//! `?start=` query parameter handling.
//!
//! `start` holds concatenated `<integer><unit>` tokens (`1d2h30m15s`, `45m`,
//! `2h2h`), units being `d`, `h`, `m` and `s`. Anything else is skipped, so a
//! malformed value degrades to a partial or zero offset.

use tracing::info;

const START_PARAM: &str = "start";

/// Startup configuration taken from the page URL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub start_offset_ms: u64,
}

impl AppConfig {
    pub fn from_query(query: &str) -> Self {
        Self {
            start_offset_ms: parse_start_offset(query),
        }
    }

    /// Reads `window.location.search`; falls back to defaults outside a page.
    pub fn from_location() -> Self {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let config = Self::from_query(&search);
        if config.start_offset_ms > 0 {
            info!(offset_ms = config.start_offset_ms, "seeding stopwatch from url");
        }
        config
    }
}

fn unit_ms(unit: char) -> Option<u64> {
    match unit {
        'd' => Some(86_400_000),
        'h' => Some(3_600_000),
        'm' => Some(60_000),
        's' => Some(1_000),
        _ => None,
    }
}

pub fn parse_duration_string(duration: &str) -> u64 {
    let mut total: u64 = 0;
    let mut chars = duration.chars().peekable();
    while chars.peek().is_some() {
        let mut value: Option<u64> = None;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d as u64));
            chars.next();
        }
        let Some(c) = chars.next() else { break };
        if let (Some(v), Some(unit)) = (value, unit_ms(c)) {
            total = total.saturating_add(v.saturating_mul(unit));
        }
    }
    total
}

/// Offset encoded by the `start` parameter of a query string (`?` optional).
pub fn parse_start_offset(query: &str) -> u64 {
    start_param(query).map_or(0, |v| parse_duration_string(&v))
}

fn start_param(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == START_PARAM)
        .map(|(_, value)| decode_component(value))
        .filter(|v| !v.is_empty())
}

// `+` and `%XX` escapes, as `URLSearchParams` would decode them.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: u64 = 1_000;

    #[test]
    fn compound_tokens_add_up() {
        assert_eq!(
            parse_duration_string("1d2h30m15s"),
            (86_400 + 2 * 3_600 + 30 * 60 + 15) * SEC
        );
    }

    #[test]
    fn empty_and_garbage_are_zero() {
        assert_eq!(parse_duration_string(""), 0);
        assert_eq!(parse_duration_string("garbage"), 0);
        assert_eq!(parse_duration_string("12"), 0);
        assert_eq!(parse_duration_string("h"), 0);
    }

    #[test]
    fn order_free_and_duplicates_accumulate() {
        assert_eq!(parse_duration_string("15s1d"), (86_400 + 15) * SEC);
        assert_eq!(parse_duration_string("2h2h"), 4 * 3_600 * SEC);
    }

    #[test]
    fn unmatched_text_is_skipped() {
        assert_eq!(parse_duration_string("1x2m"), 2 * 60 * SEC);
        assert_eq!(parse_duration_string("ab5m--10s!"), (5 * 60 + 10) * SEC);
        assert_eq!(parse_duration_string("1.5h"), 5 * 3_600 * SEC);
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(parse_duration_string("99999999999999999999999d"), u64::MAX);
        assert_eq!(parse_duration_string("18446744073709551615s1s"), u64::MAX);
    }

    #[test]
    fn reads_start_from_query() {
        assert_eq!(parse_start_offset("?start=45m"), 45 * 60 * SEC);
        assert_eq!(parse_start_offset("foo=1&start=1h"), 3_600 * SEC);
        assert_eq!(parse_start_offset("?restart=1h"), 0);
        assert_eq!(parse_start_offset("?start="), 0);
        assert_eq!(parse_start_offset("?start"), 0);
        assert_eq!(parse_start_offset(""), 0);
    }

    #[test]
    fn escapes_are_decoded_before_parsing() {
        assert_eq!(parse_start_offset("?start=1d%202h"), (86_400 + 2 * 3_600) * SEC);
        assert_eq!(parse_start_offset("?start=1h+5s"), (3_600 + 5) * SEC);
        assert_eq!(parse_start_offset("?start=%zz3s"), 3 * SEC);
    }

    #[test]
    fn config_from_query() {
        assert_eq!(
            AppConfig::from_query("?start=2h30m"),
            AppConfig {
                start_offset_ms: 9_000 * SEC
            }
        );
        assert_eq!(AppConfig::from_query("?x=1"), AppConfig::default());
    }
}
