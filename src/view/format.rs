use chrono::DateTime;

use crate::ledger::MiningStats;

/// Human-readable mining duration.
/// Sub-second values show whole milliseconds, under a minute two decimals,
/// anything longer whole minutes and seconds.
pub fn format_duration(secs: f64) -> String {
    if secs < 1.0 {
        format!("{}ms", (secs.max(0.0) * 1000.0).round() as u64)
    } else if secs < 60.0 {
        format!("{secs:.2}s")
    } else {
        let minutes = (secs / 60.0).floor() as u64;
        let seconds = (secs % 60.0).floor() as u64;
        format!("{minutes}m {seconds}s")
    }
}

pub fn format_timestamp(unix_secs: i64) -> String {
    match DateTime::from_timestamp(unix_secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("@{unix_secs}"),
    }
}

/// `f64` amounts print without a trailing `.0` for whole values.
pub fn format_amount(amount: f64) -> String {
    format!("{amount}")
}

/// First `n` characters, counted as chars rather than bytes.
pub fn truncate(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub fn short_address(address: &str) -> String {
    format!("{}...", truncate(address, 10))
}

pub fn difficulty_bar(difficulty: u32) -> String {
    "■".repeat(difficulty as usize)
}

/// Share of the adjustment interval already mined, in percent.
/// Not clamped: a server reporting more remaining blocks than the interval
/// yields a negative value.
pub fn adjustment_progress(stats: &MiningStats) -> f64 {
    if stats.difficulty_increment_interval == 0 {
        return 0.0;
    }
    let interval = stats.difficulty_increment_interval as f64;
    let remaining = stats.blocks_until_next_difficulty as f64;
    (interval - remaining) / interval * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(remaining: i64, interval: i64) -> MiningStats {
        MiningStats {
            current_difficulty: 3,
            average_mining_time: 1.0,
            blocks_until_next_difficulty: remaining,
            difficulty_increment_interval: interval,
        }
    }

    #[test]
    fn durations_pick_their_precision() {
        assert_eq!(format_duration(0.0421), "42ms");
        assert_eq!(format_duration(0.9996), "1000ms");
        assert_eq!(format_duration(2.5), "2.50s");
        assert_eq!(format_duration(59.999), "60.00s");
        assert_eq!(format_duration(60.0), "1m 0s");
        assert_eq!(format_duration(125.7), "2m 5s");
    }

    #[test]
    fn amounts_drop_trailing_zero() {
        assert_eq!(format_amount(100.0), "100");
        assert_eq!(format_amount(12.5), "12.5");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("äöüäöü", 2), "äö");
        assert_eq!(short_address("0123456789abcdef"), "0123456789...");
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
    }

    #[test]
    fn progress_is_not_clamped() {
        assert_eq!(adjustment_progress(&stats(3, 10)), 70.0);
        assert_eq!(adjustment_progress(&stats(10, 10)), 0.0);
        assert_eq!(adjustment_progress(&stats(15, 10)), -50.0);
        assert_eq!(adjustment_progress(&stats(3, 0)), 0.0);
    }

    #[test]
    fn difficulty_bar_repeats_per_level() {
        assert_eq!(difficulty_bar(3), "■■■");
        assert_eq!(difficulty_bar(0), "");
    }
}
