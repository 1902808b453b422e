//! Currency text helpers
//!
//! Model output mixes raw numbers with display strings such as `"$3.6M"`,
//! `"14,200,000"` or `"3.31x"`. [`parse_amount`] reads all of these;
//! [`format_usd_compact`] produces the display form used by the panels.

use once_cell::sync::Lazy;
use regex::Regex;

static AMOUNT_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?P<sign>[-+])?\s*\$?\s*(?P<num>(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|\.\d+)\s*(?P<suffix>k|mm|m|bn|b|t)?\s*(?:x|%|usd)?\s*$",
    )
    .ok()
});

/// Parse loose amount text into a number
///
/// Accepts an optional sign and `$`, thousands separators, a magnitude
/// suffix (`K`, `M`/`MM`, `B`/`BN`, `T`) and a trailing `x`, `%` or `USD`.
/// Returns `None` for anything else.
#[must_use]
pub fn parse_amount(text: &str) -> Option<f64> {
    let re = AMOUNT_RE.as_ref()?;
    let caps = re.captures(text)?;

    let digits = caps.name("num")?.as_str().replace(',', "");
    let mut value: f64 = digits.parse().ok()?;

    if let Some(suffix) = caps.name("suffix") {
        value *= match suffix.as_str().to_ascii_lowercase().as_str() {
            "k" => 1e3,
            "m" | "mm" => 1e6,
            "b" | "bn" => 1e9,
            "t" => 1e12,
            _ => 1.0,
        };
    }

    if caps.name("sign").is_some_and(|s| s.as_str() == "-") {
        value = -value;
    }

    value.is_finite().then_some(value)
}

/// Format USD compactly: `$3.6M`, `$250K`, `$1,420`
#[must_use]
pub fn format_usd_compact(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();

    let body = if abs >= 1e4 {
        let (value, unit) = scaled(abs);
        format!("{}{unit}", one_decimal(value))
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = abs.round() as u64;
        group_thousands(whole)
    };

    format!("{sign}${body}")
}

/// Smallest unit whose one-decimal rounding stays below 1000
fn scaled(abs: f64) -> (f64, &'static str) {
    const UNITS: [(f64, &str); 3] = [(1e3, "K"), (1e6, "M"), (1e9, "B")];
    let mut last = (abs, "");
    for (divisor, unit) in UNITS {
        let rounded = (abs / divisor * 10.0).round() / 10.0;
        last = (rounded, unit);
        if rounded < 1000.0 {
            break;
        }
    }
    last
}

fn one_decimal(value: f64) -> String {
    let text = format!("{value:.1}");
    text.strip_suffix(".0").map_or(text.clone(), str::to_string)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
