pub const PLACEHOLDER: &str = "N/A";

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `1234.5` -> `$1,234.50`
pub fn currency(amount: f64) -> String {
    let amount = finite(amount);
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        group_thousands(&(cents / 100).to_string()),
        cents % 100
    )
}

pub fn integer(value: f64) -> String {
    let value = finite(value).round();
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(&(value.abs() as u64).to_string()))
}

pub fn decimal(value: f64, digits: usize) -> String {
    format!("{:.*}", digits, finite(value))
}

/// Takes a value already expressed in percent (`12.5` -> `12.5%`).
pub fn percent(value: f64) -> String {
    format!("{:.1}%", finite(value))
}

/// `15300` -> `15.3K`
pub fn compact(value: f64) -> String {
    let value = finite(value);
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        integer(value)
    }
}

pub fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Keeps the last four characters of a credential visible.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 4 {
        return "•".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "•".repeat(8))
}

/// `in_progress` -> `In Progress`
pub fn title_case(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_and_rounds() {
        assert_eq!(currency(0.0), "$0.00");
        assert_eq!(currency(1234.5), "$1,234.50");
        assert_eq!(currency(-98765.432), "-$98,765.43");
        assert_eq!(currency(f64::NAN), "$0.00");
    }

    #[test]
    fn numbers_render_without_nan() {
        assert_eq!(integer(1_250_000.0), "1,250,000");
        assert_eq!(percent(f64::NAN), "0.0%");
        assert_eq!(compact(15_300.0), "15.3K");
        assert_eq!(compact(2_400_000.0), "2.4M");
        assert_eq!(compact(640.0), "640");
    }

    #[test]
    fn secrets_keep_a_suffix() {
        assert_eq!(mask_secret("sk_live_51H8abcd"), "••••••••abcd");
        assert_eq!(mask_secret("abc"), "•••");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn placeholders_and_labels() {
        assert_eq!(or_placeholder(None), "N/A");
        assert_eq!(or_placeholder(Some("  ")), "N/A");
        assert_eq!(or_placeholder(Some("ORD-1")), "ORD-1");
        assert_eq!(title_case("in_progress"), "In Progress");
    }
}
