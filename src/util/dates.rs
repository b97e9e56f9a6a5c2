//! Time helpers for LRU bounds.

use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Current time as epoch seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Parse an LRU duration: an integer followed by one of `s m h d w`.
pub fn parse_duration(text: &str) -> Result<Duration> {
    let text = text.trim();
    let Some(unit) = text.chars().last() else {
        bail!("empty duration; expected e.g. `2w` or `30d`");
    };

    let amount = &text[..text.len() - unit.len_utf8()];
    let amount: u64 = amount.parse().with_context(|| {
        format!(
            "invalid duration `{}`: expected <integer><unit> with unit one of s, m, h, d, w",
            text
        )
    })?;

    let seconds = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 60 * 60 * 24,
        'w' => 60 * 60 * 24 * 7,
        other => bail!(
            "invalid duration unit `{}` in `{}`; expected one of s, m, h, d, w",
            other,
            text
        ),
    };

    amount
        .checked_mul(seconds)
        .map(Duration::from_secs)
        .with_context(|| format!("duration `{}` is too large", text))
}

/// The LRU cutoff: entries last used strictly before this are selected.
pub fn timelimit(now: i64, lru: Duration) -> i64 {
    let secs = i64::try_from(lru.as_secs()).unwrap_or(i64::MAX);
    now.saturating_sub(secs)
}
