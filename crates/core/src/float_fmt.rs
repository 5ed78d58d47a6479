//! Float formatting without `format!` on floats.
//!
//! Float-to-decimal formatting has panicked on wasm in some toolchain/browser
//! combinations (`dragon.rs`). These helpers scale and round into an `i64`
//! and only ever format integers, or reshuffle the digits serde_json already
//! produced. Non-finite values print the way a browser would (`NaN`,
//! `Infinity`, `-Infinity`).

use serde_json::Number;

fn non_finite(v: f64) -> &'static str {
    if v.is_nan() {
        "NaN"
    } else if v.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// Fixed number of decimals, like `Number.prototype.toFixed`.
pub fn fmt_f64_fixed(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return non_finite(v).to_string();
    }

    let decimals = decimals.min(9);
    let scale_i64 = 10_i64.pow(decimals as u32);

    let scaled = (v * scale_i64 as f64).round();
    if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 {
        return non_finite(if v.is_sign_negative() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        })
        .to_string();
    }

    let scaled_i = scaled as i64;
    let abs_i = scaled_i.unsigned_abs();
    let scale = scale_i64 as u64;

    let mut out = String::new();
    if scaled_i < 0 {
        out.push('-');
    }
    out.push_str(&(abs_i / scale).to_string());

    if decimals > 0 {
        let frac = (abs_i % scale).to_string();
        out.push('.');
        for _ in 0..decimals.saturating_sub(frac.len()) {
            out.push('0');
        }
        out.push_str(&frac);
    }
    out
}

/// A wire number as a browser's `String(n)` would print it.
///
/// Integers keep every digit. Floats keep serde_json's shortest round-trip
/// digits, moved into plain notation when the decimal exponent is in
/// `-7 < e < 21`, and `d.ddde+N` style outside it.
pub fn fmt_number(n: &Number) -> String {
    let text = n.to_string();
    if n.is_u64() || n.is_i64() {
        return text;
    }

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let (mantissa, exponent) = match unsigned.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    // `digits` scaled so the decimal point sits after `point` of them.
    let raw = format!("{int_part}{frac_part}");
    let leading = raw.len() - raw.trim_start_matches('0').len();
    let digits = raw.trim_matches('0');
    if digits.is_empty() {
        return "0".to_string();
    }
    let point = int_part.len() as i32 - leading as i32 + exponent;
    let len = digits.len() as i32;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if len <= point && point <= 21 {
        out.push_str(digits);
        out.push_str(&"0".repeat((point - len) as usize));
    } else if 0 < point && point <= 21 {
        let (whole, frac) = digits.split_at(point as usize);
        out.push_str(whole);
        out.push('.');
        out.push_str(frac);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat((-point) as usize));
        out.push_str(digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let e = point - 1;
        out.push('e');
        out.push(if e < 0 { '-' } else { '+' });
        out.push_str(&e.unsigned_abs().to_string());
    }
    out
}
