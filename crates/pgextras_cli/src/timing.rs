use std::time::Duration;

/// `--timing` line in psql's style: milliseconds, plus a clock reading once
/// a report takes a second or more.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_secs_f64() * 1000.0;
    if elapsed < Duration::from_secs(1) {
        return format!("Time: {:.3} ms", ms);
    }
    let total_ms = elapsed.as_millis();
    let minutes = total_ms / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!(
        "Time: {:.3} ms ({:02}:{:02}.{:03})",
        ms, minutes, seconds, millis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_second() {
        assert_eq!(format_elapsed(Duration::from_micros(12_345)), "Time: 12.345 ms");
        assert_eq!(format_elapsed(Duration::ZERO), "Time: 0.000 ms");
    }

    #[test]
    fn test_clock_reading_from_one_second() {
        assert_eq!(
            format_elapsed(Duration::from_millis(1_500)),
            "Time: 1500.000 ms (00:01.500)"
        );
        assert_eq!(
            format_elapsed(Duration::from_millis(125_042)),
            "Time: 125042.000 ms (02:05.042)"
        );
    }
}
