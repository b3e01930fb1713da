//! Value coercions used by the rule engine
//!
//! Entered values are `serde_json::Value`s. Rules read them through a few
//! views: truthiness, string form, trimmed text and string length in UTF-16
//! code units. Each view matches how a browser front end would see the value.

use serde_json::Value;

/// Whether a value counts as present for truthiness checks.
///
/// `null`, `false`, `0` and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a value. `null` renders as the empty string.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(to_display_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Length as counted by the form front end (UTF-16 code units)
pub fn text_length(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Strips leading and trailing whitespace the way a browser `trim()` does.
///
/// Unlike `str::trim` this also strips U+FEFF and keeps U+0085.
pub fn trim_text(s: &str) -> &str {
    s.trim_matches(|c: char| c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{85}'))
}

/// Shortest round-trip form of a number, using the browser's layout rules:
/// plain digits for magnitudes in [1e-6, 1e21), exponent form otherwise.
fn number_to_string(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) => format_f64(f),
        None => n.to_string(),
    }
}

fn format_f64(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    if f < 0.0 {
        return format!("-{}", format_f64(-f));
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "1.2345e-7"
    let sci = format!("{:e}", f);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp + 1;

    if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (n - 1).abs())
        }
    }
}
