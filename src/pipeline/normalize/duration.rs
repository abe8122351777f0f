//! Symptom duration extraction ("5 days", "dua minggu", "since yesterday").

use std::sync::LazyLock;

use regex::Regex;

use super::text::fold;

const HOURS_PER_DAY: f64 = 24.0;
const DAYS_PER_WEEK: f64 = 7.0;
const DAYS_PER_MONTH: f64 = 30.0;

/// `<number> <unit>`: digits or an English/Indonesian number word.
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(\d+(?:[.,]\d+)?|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|fourteen|satu|dua|tiga|empat|lima|enam|tujuh|delapan|sembilan|sepuluh|sebelas|dua belas)\s*-?\s*(hours?|hrs?|days?|weeks?|months?|jam|hari|minggu|bulan)\b",
    )
    .expect("valid regex")
});

/// Indonesian `se-` prefix: sehari, seminggu, sebulan, sejam.
static SE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bse(jam|hari|minggu|bulan)\b").expect("valid regex")
});

static COUPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:a\s+)?couple\s+(?:of\s+)?(hours|days|weeks|months)\b").expect("valid regex")
});

/// "2 month old", "3-week-old": the quantity is an age.
static AGE_AFTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-?\s*old\b").expect("valid regex")
});

/// "umur 3 bulan", "aged 2 weeks": the quantity is an age.
static AGE_BEFORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:umur|usia|umurnya|usianya|berumur|berusia|aged|age)\s*$").expect("valid regex")
});

static YESTERDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:since yesterday|sejak kemarin|dari kemarin)\b").expect("valid regex")
});

fn number_value(raw: &str) -> Option<f64> {
    let value = match raw {
        "a" | "an" | "one" | "satu" => 1.0,
        "two" | "dua" => 2.0,
        "three" | "tiga" => 3.0,
        "four" | "empat" => 4.0,
        "five" | "lima" => 5.0,
        "six" | "enam" => 6.0,
        "seven" | "tujuh" => 7.0,
        "eight" | "delapan" => 8.0,
        "nine" | "sembilan" => 9.0,
        "ten" | "sepuluh" => 10.0,
        "eleven" | "sebelas" => 11.0,
        "twelve" | "dua belas" => 12.0,
        "fourteen" => 14.0,
        digits => return digits.replace(',', ".").parse().ok(),
    };
    Some(value)
}

fn to_days(amount: f64, unit: &str) -> Option<f64> {
    match unit {
        "hour" | "hours" | "hr" | "hrs" | "jam" => Some(amount / HOURS_PER_DAY),
        "day" | "days" | "hari" => Some(amount),
        "week" | "weeks" | "minggu" => Some(amount * DAYS_PER_WEEK),
        "month" | "months" | "bulan" => Some(amount * DAYS_PER_MONTH),
        _ => None,
    }
}

fn is_age(folded: &str, mention: regex::Match<'_>) -> bool {
    AGE_AFTER_RE.is_match(&folded[mention.end()..])
        || AGE_BEFORE_RE.is_match(&folded[..mention.start()])
}

/// Longest symptom duration mentioned in `text`, in days.
///
/// Ages ("my 2 month old", "umur 3 bulan") are not durations. Returns
/// `None` when nothing recognisable is mentioned.
pub fn extract_duration_days(text: &str) -> Option<f64> {
    let folded = fold(text);
    let mut mentions = Vec::new();

    let spoken = |caps: &regex::Captures<'_>| caps.get(0).is_some_and(|m| !is_age(&folded, m));

    for caps in QUANTITY_RE.captures_iter(&folded).filter(spoken) {
        if let Some(days) = number_value(&caps[1]).and_then(|n| to_days(n, &caps[2])) {
            mentions.push(days);
        }
    }
    for caps in SE_PREFIX_RE.captures_iter(&folded).filter(spoken) {
        mentions.extend(to_days(1.0, &caps[1]));
    }
    for caps in COUPLE_RE.captures_iter(&folded).filter(spoken) {
        mentions.extend(to_days(2.0, &caps[1]));
    }
    if YESTERDAY_RE.is_match(&folded) {
        mentions.push(1.0);
    }

    mentions
        .into_iter()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .max_by(f64::total_cmp)
}
