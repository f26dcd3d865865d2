//! Small text helpers shared by the chat replies, prompts and API.

/// Render a float the way the dashboard has always shown figures:
/// whole numbers keep one decimal (`25.0`), others print in shortest form
/// (`12.75`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A word starts at any letter not preceded by another letter, so
/// `"united states"` becomes `"United States"` and `"x-ray"` becomes `"X-Ray"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
