use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Shown for a last-seen timestamp that is missing or unreadable
pub const JUST_NOW: &str = "Just now";

/// Clamp NaN/inf to zero so arithmetic and ordering stay total
#[inline]
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Format a stake amount for table cells.
/// Examples: "2.30M", "1.5K", "999"
pub fn format_stake(stake: f64) -> String {
    let stake = finite_or_zero(stake);
    if stake >= 1_000_000.0 {
        format!("{:.2}M", stake / 1_000_000.0)
    } else if stake >= 1_000.0 {
        format!("{:.1}K", stake / 1_000.0)
    } else {
        format!("{}", stake.trunc() as i64)
    }
}

/// Total stake on the summary card uses one decimal of millions ("152.4M")
pub fn format_total_stake(stake: f64) -> String {
    let stake = finite_or_zero(stake);
    if stake == 0.0 {
        "0".to_string()
    } else {
        format!("{:.1}M", stake / 1_000_000.0)
    }
}

/// Commission percent with two decimals ("1.50%")
pub fn format_commission(percent: f64) -> String {
    format!("{:.2}%", finite_or_zero(percent))
}

/// Performance score in [0,1] as a rounded whole percent ("95%")
pub fn performance_percent(score: f64) -> u32 {
    (finite_or_zero(score) * 100.0).round().clamp(0.0, 100.0) as u32
}

pub fn format_performance(score: f64) -> String {
    format!("{}%", performance_percent(score))
}

/// Average performance on the summary card keeps one decimal ("87.3%")
pub fn format_avg_performance(score: f64) -> String {
    let score = finite_or_zero(score);
    if score == 0.0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", score * 100.0)
    }
}

pub fn format_avg_commission(percent: f64) -> String {
    let percent = finite_or_zero(percent);
    if percent == 0.0 {
        "0%".to_string()
    } else {
        format!("{percent:.2}%")
    }
}

/// "93.3% uptime" style ratio for the active-pnodes card
pub fn format_uptime_ratio(active: u64, total: u64) -> String {
    if total == 0 {
        "100% uptime".to_string()
    } else {
        format!("{:.1}% uptime", active as f64 / total as f64 * 100.0)
    }
}

/// Parse the service's timestamps. Accepts RFC 3339 and the naive
/// `2024-05-01T10:00:00.123456` form, which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Time of day ("14:05") in the given zone, or "Just now"
pub fn format_last_seen_in<Tz: TimeZone>(raw: Option<&str>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    raw.and_then(parse_timestamp)
        .map(|dt| dt.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_else(|| JUST_NOW.to_string())
}

pub fn format_last_seen(raw: Option<&str>) -> String {
    format_last_seen_in(raw, &Local)
}

/// Shorten a public key to 16 characters plus an ellipsis
pub fn short_key(key: &str) -> String {
    let head: String = key.chars().take(16).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stake_thresholds() {
        assert_eq!(format_stake(999.0), "999");
        assert_eq!(format_stake(1500.0), "1.5K");
        assert_eq!(format_stake(2_300_000.0), "2.30M");
        assert_eq!(format_stake(1_000.0), "1.0K");
        assert_eq!(format_stake(1_000_000.0), "1.00M");
        assert_eq!(format_stake(0.0), "0");
    }

    #[test]
    fn test_format_stake_non_finite() {
        assert_eq!(format_stake(f64::NAN), "0");
        assert_eq!(format_stake(f64::INFINITY), "0");
    }

    #[test]
    fn test_percentages() {
        assert_eq!(format_commission(1.5), "1.50%");
        assert_eq!(format_performance(0.954), "95%");
        assert_eq!(format_performance(f64::NAN), "0%");
        assert_eq!(format_avg_performance(0.873), "87.3%");
        assert_eq!(format_avg_commission(0.0), "0%");
        assert_eq!(format_uptime_ratio(0, 0), "100% uptime");
        assert_eq!(format_uptime_ratio(27, 30), "90.0% uptime");
        assert_eq!(format_total_stake(152_400_000.0), "152.4M");
    }

    #[test]
    fn test_last_seen_fallbacks() {
        assert_eq!(format_last_seen(None), JUST_NOW);
        assert_eq!(format_last_seen(Some("")), JUST_NOW);
        assert_eq!(format_last_seen(Some("yesterday-ish")), JUST_NOW);
    }

    #[test]
    fn test_last_seen_formats_time_of_day() {
        assert_eq!(
            format_last_seen_in(Some("2024-05-01T10:07:33.123456"), &Utc),
            "10:07"
        );
        assert_eq!(
            format_last_seen_in(Some("2024-05-01T10:07:33+02:00"), &Utc),
            "08:07"
        );
        let local = format_last_seen(Some("2024-05-01T10:07:33Z"));
        assert_eq!(local.len(), 5);
        assert_eq!(&local[2..3], ":");
    }

    #[test]
    fn test_short_key() {
        assert_eq!(short_key("xnd_tes_0123456789abcdef"), "xnd_tes_01234567...");
        assert_eq!(short_key("abc"), "abc...");
    }
}
