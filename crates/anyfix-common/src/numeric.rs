//! JavaScript-compatible number formatting for numeric literal types.

/// Format an `f64` the way JavaScript's `Number.prototype.toString` does.
pub fn js_number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() {
            "-Infinity".to_string()
        } else {
            "Infinity".to_string()
        };
    }

    let abs = value.abs();
    if !(1e-6..1e21).contains(&abs) {
        let mut formatted = format!("{:e}", value);
        if let Some(split) = formatted.find('e') {
            let (mantissa, exp) = formatted.split_at(split);
            let exp_digits = &exp[1..];
            let (sign, digits) = match exp_digits.strip_prefix('-') {
                Some(rest) => ('-', rest),
                None => ('+', exp_digits),
            };
            formatted = format!("{mantissa}e{sign}{digits}");
        }
        return formatted;
    }

    value.to_string()
}

#[cfg(test)]
#[path = "tests/numeric_tests.rs"]
mod tests;
