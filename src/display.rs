//! Render-time formatting of listing fields

use chrono::{DateTime, Utc};

/// Abbreviated usage count: "950", "12.4K", "1.2M"
pub fn format_usage(usage: u64) -> String {
    if usage < 1_000 {
        return usage.to_string();
    }
    // 999_950 rounds to 1000.0K, which reads as 1M
    let thousands = tenths(usage, 1_000);
    if thousands < 10_000 {
        return abbreviate(thousands, "K");
    }
    abbreviate(tenths(usage, 1_000_000), "M")
}

/// `value / unit` in rounded tenths, widened so `u64::MAX` cannot overflow
fn tenths(value: u64, unit: u64) -> u128 {
    (u128::from(value) * 10 + u128::from(unit) / 2) / u128::from(unit)
}

fn abbreviate(tenths: u128, suffix: &str) -> String {
    if tenths % 10 == 0 {
        format!("{}{}", tenths / 10, suffix)
    } else {
        format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Relative time such as "2 days ago", derived from an absolute timestamp
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - at;
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if hours < 1 {
        "just now".to_string()
    } else if days < 1 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else if days < 30 {
        plural(days / 7, "week")
    } else if days < 365 {
        plural(days / 30, "month")
    } else {
        plural(days / 365, "year")
    }
}

/// First `limit` tags and how many were left out
pub fn truncate_tags(tags: &[String], limit: usize) -> (&[String], usize) {
    let shown = &tags[..tags.len().min(limit)];
    (shown, tags.len() - shown.len())
}

/// Tags joined for a single line, with a "+N" marker for the rest
pub fn tag_line(tags: &[String], limit: usize) -> String {
    let (shown, hidden) = truncate_tags(tags, limit);
    let mut line = shown
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ");
    if hidden > 0 {
        line.push_str(&format!(" +{}", hidden));
    }
    line
}

/// "4.9" style rating
pub fn format_rating(rating: f32) -> String {
    format!("{:.1}", rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::test_helpers::reference_now;
    use chrono::Duration;

    #[test]
    fn test_format_usage() {
        assert_eq!(format_usage(950), "950");
        assert_eq!(format_usage(12_400), "12.4K");
        assert_eq!(format_usage(2_000), "2K");
        assert_eq!(format_usage(1_234_567), "1.2M");
    }

    #[test]
    fn test_format_usage_rounds_up_into_next_unit() {
        assert_eq!(format_usage(999_949), "999.9K");
        assert_eq!(format_usage(999_950), "1M");
        assert_eq!(format_usage(999_999), "1M");
        assert_eq!(format_usage(u64::MAX), "18446744073709.6M");
    }

    #[test]
    fn test_format_relative() {
        let now = reference_now();
        assert_eq!(format_relative(now, now), "just now");
        assert_eq!(format_relative(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(format_relative(now - Duration::days(1), now), "1 day ago");
        assert_eq!(format_relative(now - Duration::days(2), now), "2 days ago");
        assert_eq!(format_relative(now - Duration::days(7), now), "1 week ago");
        assert_eq!(format_relative(now - Duration::days(21), now), "3 weeks ago");
        assert_eq!(format_relative(now - Duration::days(65), now), "2 months ago");
        assert_eq!(format_relative(now - Duration::days(800), now), "2 years ago");
    }

    #[test]
    fn test_truncate_tags() {
        let tags: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let (shown, hidden) = truncate_tags(&tags, 3);
        assert_eq!(shown.len(), 3);
        assert_eq!(hidden, 2);
        assert_eq!(tag_line(&tags, 3), "#a #b #c +2");
        assert_eq!(tag_line(&tags[..2], 3), "#a #b");
    }
}
