/// Formats a gold amount with K/M/B suffixes, e.g. `-1.5K`, `2.35M`.
pub fn format_gp(amount: f64) -> String {
    if amount == 0.0 || !amount.is_finite() {
        return "0".to_string();
    }

    let abs = amount.abs();
    let sign = if amount < 0.0 { "-" } else { "" };

    if abs >= 1_000_000_000.0 {
        format!("{sign}{:.2}B", abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{sign}{:.2}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{sign}{:.1}K", abs / 1_000.0)
    } else if abs.fract() == 0.0 {
        format!("{sign}{abs:.0}")
    } else {
        format!("{sign}{abs:.2}")
    }
}

pub fn format_xp(xp: f64) -> String {
    if xp >= 1_000_000.0 {
        format!("{:.1}M", xp / 1_000_000.0)
    } else if xp >= 1_000.0 {
        format!("{:.1}K", xp / 1_000.0)
    } else if xp.fract() == 0.0 {
        format!("{xp:.0}")
    } else {
        format!("{xp:.1}")
    }
}
