//! Simulated clock helpers.

use chrono::NaiveTime;

pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Render seconds since midnight as `HH:MM:SS`, with a `+Nd` suffix past
/// the first day.
pub fn format_clock(seconds: u32) -> String {
    let days = seconds / SECONDS_PER_DAY;
    let clock = NaiveTime::from_num_seconds_from_midnight_opt(seconds % SECONDS_PER_DAY, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{seconds}s"));

    if days == 0 {
        clock
    } else {
        format!("{clock}+{days}d")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(6 * 3600 + 61), "06:01:01");
        assert_eq!(format_clock(SECONDS_PER_DAY + 30), "00:00:30+1d");
    }
}
